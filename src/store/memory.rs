//! In-process storage backend.
//!
//! Backs the test suite and keeps the repository contracts honest: a single
//! write lock per call gives the same atomicity the Postgres constraints
//! provide, so uniqueness behaves identically across backends.

use super::{
    AnswerStore, QuestionStore, SessionInsert, SessionStore, StoreError, UserInsert, UserStore,
};
use crate::domain::{Answer, NewSession, NewUser, Question, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Vec<u8>, Session>,
    questions: HashMap<Uuid, Question>,
    answers: HashMap<Uuid, Answer>,
}

/// Shared in-memory store; cloning shares the underlying maps.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users; lets tests assert that failed registrations
    /// leave no partial state behind.
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Number of stored sessions, active or not; lets tests assert that
    /// failed sign-ins create nothing and sign-outs delete nothing.
    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserInsert, StoreError> {
        // Uniqueness checks and the write happen under one lock, matching
        // the constraint-backed atomicity of the Postgres backend.
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Ok(UserInsert::DuplicateUsername);
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Ok(UserInsert::DuplicateEmail);
        }
        let record = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            password_hash: user.password_hash,
            password_salt: user.password_salt,
            created_at: Utc::now(),
        };
        inner.users.insert(record.id, record.clone());
        Ok(UserInsert::Created(record))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.users.remove(&id))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: NewSession) -> Result<SessionInsert, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&session.token_hash) {
            return Ok(SessionInsert::DuplicateToken);
        }
        let record = Session {
            token_hash: session.token_hash.clone(),
            user_id: session.user_id,
            login_at: session.login_at,
            expires_at: session.expires_at,
            logout_at: None,
        };
        inner.sessions.insert(session.token_hash, record.clone());
        Ok(SessionInsert::Created(record))
    }

    async fn find_by_token_hash(&self, token_hash: &[u8]) -> Result<Option<Session>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.sessions.get(token_hash).cloned())
    }

    async fn mark_logged_out(
        &self,
        token_hash: &[u8],
        at: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get_mut(token_hash) {
            // logout_at is a one-way transition; never overwrite it.
            Some(session) if session.logout_at.is_none() => {
                session.logout_at = Some(at);
                Ok(Some(session.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn insert(&self, user_id: Uuid, content: String) -> Result<Question, StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = Question {
            id: Uuid::new_v4(),
            user_id,
            content,
            created_at: now,
            updated_at: now,
        };
        inner.questions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.questions.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Question>, StoreError> {
        let inner = self.inner.read().await;
        let mut questions: Vec<_> = inner.questions.values().cloned().collect();
        questions.sort_by_key(|question| question.created_at);
        Ok(questions)
    }

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Question>, StoreError> {
        let inner = self.inner.read().await;
        let mut questions: Vec<_> = inner
            .questions
            .values()
            .filter(|question| question.user_id == user_id)
            .cloned()
            .collect();
        questions.sort_by_key(|question| question.created_at);
        Ok(questions)
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.questions.get_mut(&id) {
            Some(question) => {
                question.content = content;
                question.updated_at = at;
                Ok(Some(question.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.questions.remove(&id))
    }
}

#[async_trait]
impl AnswerStore for MemoryStore {
    async fn insert(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Answer, StoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let record = Answer {
            id: Uuid::new_v4(),
            question_id,
            user_id,
            content,
            created_at: now,
            updated_at: now,
        };
        inner.answers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Answer>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.answers.get(&id).cloned())
    }

    async fn by_question(&self, question_id: Uuid) -> Result<Vec<Answer>, StoreError> {
        let inner = self.inner.read().await;
        let mut answers: Vec<_> = inner
            .answers
            .values()
            .filter(|answer| answer.question_id == question_id)
            .cloned()
            .collect();
        answers.sort_by_key(|answer| answer.created_at);
        Ok(answers)
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Answer>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.answers.get_mut(&id) {
            Some(answer) => {
                answer.content = content;
                answer.updated_at = at;
                Ok(Some(answer.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Answer>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.answers.remove(&id))
    }
}
