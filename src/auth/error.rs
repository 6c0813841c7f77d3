//! Stable error kinds for registration, sign-in, and authorization.

use crate::store::StoreError;
use thiserror::Error;

/// Reason an authorization check denied access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    NotOwner,
    NotAdmin,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner => f.write_str("caller does not own the resource"),
            Self::NotAdmin => f.write_str("caller is not an admin"),
        }
    }
}

/// Expected, caller-recoverable outcomes of the auth core.
///
/// Every kind here is terminal for the request; nothing is retried
/// internally. Store failures propagate unchanged through the transparent
/// variant so callers can tell infrastructure trouble apart from a denied
/// or failed authentication.
#[derive(Debug, Error)]
pub enum Error {
    #[error("this username has already been taken")]
    DuplicateUsername,
    #[error("this email has already been registered")]
    DuplicateEmail,
    #[error("this username does not exist")]
    UnknownUsername,
    #[error("password did not match")]
    BadCredentials,
    #[error("user has not signed in")]
    NotSignedIn,
    #[error("user is signed out")]
    SignedOut,
    #[error("session has expired")]
    SessionExpired,
    #[error("unauthorized access: {0}")]
    Denied(DenyReason),
    #[error(transparent)]
    Store(#[from] StoreError),
}
