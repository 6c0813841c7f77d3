//! Question operations: owner-exclusive edits, owner-or-admin deletes.

use crate::auth::{self, authorize, Access, SessionManager};
use crate::domain::Question;
use crate::store::{QuestionStore, UserStore};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("entered question uuid does not exist")]
    NotFound,
    #[error("user with entered uuid does not exist")]
    UnknownUser,
    #[error(transparent)]
    Auth(#[from] auth::Error),
}

#[derive(Clone)]
pub struct QuestionService {
    sessions: SessionManager,
    questions: Arc<dyn QuestionStore>,
    users: Arc<dyn UserStore>,
}

impl QuestionService {
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        questions: Arc<dyn QuestionStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            sessions,
            questions,
            users,
        }
    }

    /// Create a question owned by the caller.
    pub async fn create(&self, token: &str, content: String) -> Result<Question, QuestionError> {
        let actor = self.sessions.resolve_user(token).await?;
        Ok(self.questions.insert(actor.id, content).await.map_err(auth::Error::from)?)
    }

    /// List every question; any signed-in user may read.
    pub async fn all(&self, token: &str) -> Result<Vec<Question>, QuestionError> {
        self.sessions.resolve_user(token).await?;
        Ok(self.questions.all().await.map_err(auth::Error::from)?)
    }

    /// List the questions posted by one user.
    pub async fn by_user(&self, token: &str, user_id: Uuid) -> Result<Vec<Question>, QuestionError> {
        self.sessions.resolve_user(token).await?;
        if self
            .users
            .find_by_id(user_id)
            .await
            .map_err(auth::Error::from)?
            .is_none()
        {
            return Err(QuestionError::UnknownUser);
        }
        Ok(self
            .questions
            .by_user(user_id)
            .await
            .map_err(auth::Error::from)?)
    }

    pub async fn get(&self, token: &str, id: Uuid) -> Result<Question, QuestionError> {
        self.sessions.resolve_user(token).await?;
        self.questions
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(QuestionError::NotFound)
    }

    /// Edit a question's content. Owner-exclusive: admins are denied too.
    pub async fn edit(
        &self,
        token: &str,
        id: Uuid,
        content: String,
    ) -> Result<Question, QuestionError> {
        let actor = self.sessions.resolve_user(token).await?;
        let question = self
            .questions
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(QuestionError::NotFound)?;
        authorize(&actor, question.user_id, Access::OwnerOnly).map_err(auth::Error::Denied)?;
        self.questions
            .update_content(id, content, Utc::now())
            .await
            .map_err(auth::Error::from)?
            .ok_or(QuestionError::NotFound)
    }

    /// Delete a question; the owner or any admin may.
    pub async fn delete(&self, token: &str, id: Uuid) -> Result<Question, QuestionError> {
        let actor = self.sessions.resolve_user(token).await?;
        let question = self
            .questions
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(QuestionError::NotFound)?;
        authorize(&actor, question.user_id, Access::OwnerOrAdmin).map_err(auth::Error::Denied)?;
        self.questions
            .delete(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(QuestionError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::{password, DenyReason};
    use crate::domain::{NewUser, Role, User};
    use crate::store::{MemoryStore, UserInsert};
    use secrecy::SecretString;

    async fn seed_user(store: &MemoryStore, username: &str, role: Role) -> User {
        let credentials = password::hash("pw").unwrap();
        let outcome = UserStore::insert(
            store,
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                role,
                password_hash: credentials.hash,
                password_salt: credentials.salt,
            },
        )
        .await
        .unwrap();
        match outcome {
            UserInsert::Created(user) => user,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    async fn sign_in(sessions: &SessionManager, username: &str) -> String {
        sessions
            .sign_in(username, &SecretString::from("pw".to_string()))
            .await
            .unwrap()
            .token
    }

    fn service(store: &MemoryStore) -> (QuestionService, SessionManager) {
        let sessions =
            SessionManager::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let service = QuestionService::new(
            sessions.clone(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        (service, sessions)
    }

    #[tokio::test]
    async fn edit_denies_a_non_owner_admin() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", Role::Member).await;
        seed_user(&store, "root", Role::Admin).await;
        let (service, sessions) = service(&store);

        let alice_token = sign_in(&sessions, "alice").await;
        let question = service
            .create(&alice_token, "What is ownership?".to_string())
            .await
            .unwrap();

        let admin_token = sign_in(&sessions, "root").await;
        let err = service
            .edit(&admin_token, question.id, "hijacked".to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuestionError::Auth(auth::Error::Denied(DenyReason::NotOwner))
        ));
    }

    #[tokio::test]
    async fn delete_allows_a_non_owner_admin() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", Role::Member).await;
        seed_user(&store, "root", Role::Admin).await;
        let (service, sessions) = service(&store);

        let alice_token = sign_in(&sessions, "alice").await;
        let question = service
            .create(&alice_token, "To be deleted".to_string())
            .await
            .unwrap();

        let admin_token = sign_in(&sessions, "root").await;
        let deleted = service.delete(&admin_token, question.id).await.unwrap();
        assert_eq!(deleted.id, question.id);
    }

    #[tokio::test]
    async fn delete_denies_an_unrelated_member() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", Role::Member).await;
        seed_user(&store, "bob", Role::Member).await;
        let (service, sessions) = service(&store);

        let alice_token = sign_in(&sessions, "alice").await;
        let question = service
            .create(&alice_token, "Mine".to_string())
            .await
            .unwrap();

        let bob_token = sign_in(&sessions, "bob").await;
        let err = service.delete(&bob_token, question.id).await.unwrap_err();
        assert!(matches!(
            err,
            QuestionError::Auth(auth::Error::Denied(DenyReason::NotOwner))
        ));
    }

    #[tokio::test]
    async fn missing_question_is_not_found_not_denied() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", Role::Member).await;
        let (service, sessions) = service(&store);
        let token = sign_in(&sessions, "alice").await;
        let err = service
            .edit(&token, Uuid::new_v4(), "nope".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, QuestionError::NotFound));
    }

    #[tokio::test]
    async fn by_user_requires_the_user_to_exist() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", Role::Member).await;
        let (service, sessions) = service(&store);
        let token = sign_in(&sessions, "alice").await;
        let err = service.by_user(&token, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, QuestionError::UnknownUser));
    }

    #[tokio::test]
    async fn operations_require_a_live_session() {
        let store = MemoryStore::new();
        let (service, _sessions) = service(&store);
        let err = service.all("no-such-token").await.unwrap_err();
        assert!(matches!(
            err,
            QuestionError::Auth(auth::Error::NotSignedIn)
        ));
    }
}
