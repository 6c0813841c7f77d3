//! Repository contracts for users, sessions, questions, and answers.
//!
//! The auth core and the resource services only ever talk to these traits.
//! Absence of a record is `Ok(None)`, never an error. Uniqueness conflicts
//! are reported as explicit outcomes rather than errors so callers can rely
//! on the store's own constraints instead of a check-then-write sequence.

pub mod memory;
pub mod postgres;

use crate::domain::{Answer, NewSession, NewUser, Question, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Opaque infrastructure failure from a storage backend.
///
/// Deliberately distinct from every expected auth/service error kind;
/// callers surface it as such instead of coercing it into one of them.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(#[from] anyhow::Error);

/// Outcome of attempting to persist a new user.
#[derive(Debug)]
pub enum UserInsert {
    Created(User),
    DuplicateUsername,
    DuplicateEmail,
}

/// Outcome of attempting to persist a new session.
#[derive(Debug)]
pub enum SessionInsert {
    Created(Session),
    DuplicateToken,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Insert a new user; the store assigns the id and enforces the
    /// username/email unique constraints.
    async fn insert(&self, user: NewUser) -> Result<UserInsert, StoreError>;
    /// Delete a user, returning the removed record if it existed.
    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session keyed by token hash.
    async fn insert(&self, session: NewSession) -> Result<SessionInsert, StoreError>;
    async fn find_by_token_hash(&self, token_hash: &[u8]) -> Result<Option<Session>, StoreError>;
    /// Set `logout_at` on an active session. Returns the updated record, or
    /// `None` if no session matches or it was already logged out; a set
    /// `logout_at` is never overwritten. Sessions are retained, not deleted.
    async fn mark_logged_out(
        &self,
        token_hash: &[u8],
        at: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError>;
}

#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn insert(&self, user_id: Uuid, content: String) -> Result<Question, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError>;
    async fn all(&self) -> Result<Vec<Question>, StoreError>;
    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Question>, StoreError>;
    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Question>, StoreError>;
}

#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn insert(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Answer, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Answer>, StoreError>;
    async fn by_question(&self, question_id: Uuid) -> Result<Vec<Answer>, StoreError>;
    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Answer>, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<Option<Answer>, StoreError>;
}
