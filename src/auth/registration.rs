//! New-user registration.

use crate::auth::error::Error;
use crate::auth::password;
use crate::domain::{NewUser, Role, User};
use crate::store::{StoreError, UserInsert, UserStore};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::debug;

/// Candidate user supplied by the caller; the store assigns the id and the
/// flow assigns the role.
#[derive(Debug)]
pub struct Signup {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: SecretString,
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Registrar {
    users: Arc<dyn UserStore>,
}

impl Registrar {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new user with a fresh salt/hash pair and the default
    /// `member` role.
    ///
    /// # Errors
    /// `DuplicateUsername` if the username is taken, else `DuplicateEmail`
    /// if the email is; the username check runs first so callers can tell
    /// the two apart. The store's unique constraints backstop both checks,
    /// so concurrent duplicate registrations cannot both commit.
    pub async fn register(&self, signup: Signup) -> Result<User, Error> {
        let email = normalize_email(&signup.email);

        if self
            .users
            .find_by_username(&signup.username)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateUsername);
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(Error::DuplicateEmail);
        }

        let credentials =
            password::hash(signup.password.expose_secret()).map_err(StoreError::from)?;

        let outcome = self
            .users
            .insert(NewUser {
                username: signup.username,
                email,
                first_name: signup.first_name,
                last_name: signup.last_name,
                role: Role::Member,
                password_hash: credentials.hash,
                password_salt: credentials.salt,
            })
            .await?;

        match outcome {
            UserInsert::Created(user) => {
                debug!(user_id = %user.id, "user registered");
                Ok(user)
            }
            UserInsert::DuplicateUsername => Err(Error::DuplicateUsername),
            UserInsert::DuplicateEmail => Err(Error::DuplicateEmail),
        }
    }
}
