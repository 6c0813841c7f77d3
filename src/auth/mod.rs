//! Credential and session-authorization core.
//!
//! Everything that decides "who is calling" and "are they allowed" lives
//! here: salted password hashing, registration with uniqueness enforcement,
//! bearer-token sessions with a fixed lifetime, and the
//! ownership-or-admin authorization policy the resource services share.
//! Persistence is reached only through the contracts in [`crate::store`].

pub mod error;
pub mod password;
pub mod policy;
pub mod registration;
pub mod session;
pub mod token;

pub use error::{DenyReason, Error};
pub use policy::{authorize, Access};
pub use registration::{Registrar, Signup};
pub use session::{SessionManager, SignedIn, DEFAULT_SESSION_TTL_SECONDS};
