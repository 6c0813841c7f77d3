//! User profile lookup and admin-only user deletion.

use crate::auth::{self, authorize, Access, SessionManager};
use crate::domain::User;
use crate::store::UserStore;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user with entered uuid does not exist")]
    NotFound,
    #[error(transparent)]
    Auth(#[from] auth::Error),
}

#[derive(Clone)]
pub struct UserService {
    sessions: SessionManager,
    users: Arc<dyn UserStore>,
}

impl UserService {
    #[must_use]
    pub fn new(sessions: SessionManager, users: Arc<dyn UserStore>) -> Self {
        Self { sessions, users }
    }

    /// Fetch any user's profile; requires only a live session.
    pub async fn profile(&self, token: &str, user_id: Uuid) -> Result<User, UserError> {
        self.sessions.resolve_user(token).await?;
        self.users
            .find_by_id(user_id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(UserError::NotFound)
    }

    /// Delete a user. Admin-exclusive; ownership is irrelevant, so a member
    /// cannot even delete their own account through this path. The role
    /// check runs before the target lookup, matching the policy that
    /// authorization failures take precedence over existence leaks.
    pub async fn delete(&self, token: &str, user_id: Uuid) -> Result<User, UserError> {
        let actor = self.sessions.resolve_user(token).await?;
        authorize(&actor, user_id, Access::AdminOnly).map_err(auth::Error::Denied)?;
        self.users
            .delete(user_id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(UserError::NotFound)
    }
}
