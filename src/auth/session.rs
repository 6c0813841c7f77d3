//! Bearer-token session issuance, resolution, and invalidation.
//!
//! Per session the state machine is `Active -> Expired` (evaluated at read
//! time against `expires_at`, never stored) and `Active -> LoggedOut`
//! (stored, terminal). Identity is recovered solely through the session
//! store lookup; tokens carry no claims and there is no signing key.

use crate::auth::error::Error;
use crate::auth::{password, token};
use crate::domain::{NewSession, Session, User};
use crate::store::{SessionInsert, SessionStore, StoreError, UserStore};
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::debug;

/// Fixed session lifetime.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 60 * 60;

/// Result of a successful sign-in. The raw token appears here once and is
/// never recoverable from storage afterwards.
#[derive(Clone, Debug)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionManager {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            users,
            sessions,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECONDS),
        }
    }

    /// Override the session lifetime; configuration, not per-request state.
    #[must_use]
    pub fn with_ttl_seconds(mut self, seconds: i64) -> Self {
        self.ttl = Duration::seconds(seconds);
        self
    }

    /// Authenticate a username/password pair and issue a new session.
    ///
    /// # Errors
    /// `UnknownUsername` if no such user, `BadCredentials` on a hash
    /// mismatch; no session record is created in either case.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SignedIn, Error> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(Error::UnknownUsername)?;

        let derived = password::derive(password.expose_secret(), &user.password_salt);
        if derived != user.password_hash {
            return Err(Error::BadCredentials);
        }

        let login_at = Utc::now();
        let expires_at = login_at + self.ttl;

        // Token hashes collide only if the RNG misbehaves; retry a few times
        // before giving up rather than surfacing a duplicate to the caller.
        for _ in 0..3 {
            let raw = token::generate().map_err(StoreError::from)?;
            let session = NewSession {
                token_hash: token::token_hash(&raw),
                user_id: user.id,
                login_at,
                expires_at,
            };
            match self.sessions.insert(session).await? {
                SessionInsert::Created(_) => {
                    debug!(user_id = %user.id, "session issued");
                    return Ok(SignedIn {
                        user,
                        token: raw,
                        expires_at,
                    });
                }
                SessionInsert::DuplicateToken => {}
            }
        }

        Err(StoreError::from(anyhow!("failed to generate unique session token")).into())
    }

    /// Resolve a bearer token to its user.
    ///
    /// # Errors
    /// `NotSignedIn` if no session matches (or the owning user no longer
    /// exists), `SignedOut` once the session was explicitly ended,
    /// `SessionExpired` past `expires_at`.
    pub async fn resolve_user(&self, token: &str) -> Result<User, Error> {
        let session = self
            .sessions
            .find_by_token_hash(&token::token_hash(token))
            .await?
            .ok_or(Error::NotSignedIn)?;

        if session.logout_at.is_some() {
            return Err(Error::SignedOut);
        }
        if session.expired_at(Utc::now()) {
            return Err(Error::SessionExpired);
        }

        // A deleted user's outstanding tokens stop resolving.
        self.users
            .find_by_id(session.user_id)
            .await?
            .ok_or(Error::NotSignedIn)
    }

    /// End a session explicitly. The record is retained with `logout_at`
    /// set; it is never deleted.
    ///
    /// # Errors
    /// `NotSignedIn` if the token matches no session or the session was
    /// already logged out; both map to the one kind.
    pub async fn sign_out(&self, token: &str) -> Result<Session, Error> {
        self.sessions
            .mark_logged_out(&token::token_hash(token), Utc::now())
            .await?
            .ok_or(Error::NotSignedIn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::{NewUser, Role};
    use crate::store::{MemoryStore, UserInsert};

    async fn seed_user(store: &MemoryStore, username: &str, plaintext: &str) -> User {
        let credentials = password::hash(plaintext).unwrap();
        let outcome = UserStore::insert(
            store,
            NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                role: Role::Member,
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

    fn manager(store: &MemoryStore) -> SessionManager {
        SessionManager::new(Arc::new(store.clone()), Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn sign_in_unknown_username() {
        let store = MemoryStore::new();
        let sessions = manager(&store);
        let err = sessions
            .sign_in("ghost", &SecretString::from("pw".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnknownUsername));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn sign_in_wrong_password_creates_no_session() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", "right").await;
        let sessions = manager(&store);
        let err = sessions
            .sign_in("alice", &SecretString::from("wrong".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadCredentials));
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn expires_exactly_one_hour_after_login() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", "pw").await;
        let sessions = manager(&store);
        let signed_in = sessions
            .sign_in("alice", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
        let stored = store
            .find_by_token_hash(&token::token_hash(&signed_in.token))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.expires_at - stored.login_at, Duration::hours(1));
        assert_eq!(stored.expires_at, signed_in.expires_at);
    }

    #[tokio::test]
    async fn resolve_round_trip() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice", "pw").await;
        let sessions = manager(&store);
        let signed_in = sessions
            .sign_in("alice", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
        let resolved = sessions.resolve_user(&signed_in.token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn resolve_never_issued_token() {
        let store = MemoryStore::new();
        let sessions = manager(&store);
        let err = sessions.resolve_user("never-issued").await.unwrap_err();
        assert!(matches!(err, Error::NotSignedIn));
    }

    #[tokio::test]
    async fn signed_out_is_distinct_from_not_signed_in() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", "pw").await;
        let sessions = manager(&store);
        let signed_in = sessions
            .sign_in("alice", &SecretString::from("pw".to_string()))
            .await
            .unwrap();

        let session = sessions.sign_out(&signed_in.token).await.unwrap();
        assert!(session.logout_at.is_some());

        let err = sessions.resolve_user(&signed_in.token).await.unwrap_err();
        assert!(matches!(err, Error::SignedOut));

        // Session records are retained after sign-out.
        assert_eq!(store.session_count().await, 1);

        let err = sessions.sign_out(&signed_in.token).await.unwrap_err();
        assert!(matches!(err, Error::NotSignedIn));
    }

    #[tokio::test]
    async fn expired_sessions_resolve_to_session_expired() {
        let store = MemoryStore::new();
        seed_user(&store, "alice", "pw").await;
        let sessions = manager(&store).with_ttl_seconds(0);
        let signed_in = sessions
            .sign_in("alice", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
        let err = sessions.resolve_user(&signed_in.token).await.unwrap_err();
        assert!(matches!(err, Error::SessionExpired));
    }

    #[tokio::test]
    async fn deleted_user_invalidates_outstanding_tokens() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "alice", "pw").await;
        let sessions = manager(&store);
        let signed_in = sessions
            .sign_in("alice", &SecretString::from("pw".to_string()))
            .await
            .unwrap();
        UserStore::delete(&store, user.id).await.unwrap();
        let err = sessions.resolve_user(&signed_in.token).await.unwrap_err();
        assert!(matches!(err, Error::NotSignedIn));
    }
}
