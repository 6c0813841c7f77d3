//! Salted password hashing and verification.
//!
//! `hash` draws a fresh random salt per call, so identical passwords never
//! share a stored hash. `derive` recomputes the hash for a stored salt at
//! sign-in. Password content is not policed here; even the empty string is
//! hashed like any other input.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha512};

const SALT_BYTES: usize = 16;

/// Salt/hash pair suitable for storage on the user record.
#[derive(Clone, Debug)]
pub struct PasswordHash {
    pub salt: String,
    pub hash: String,
}

/// Hash a plaintext password under a freshly generated salt.
///
/// # Errors
/// Returns an error if the operating system RNG fails.
pub fn hash(plaintext: &str) -> Result<PasswordHash> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate password salt")?;
    let salt = URL_SAFE_NO_PAD.encode(bytes);
    let hash = derive(plaintext, &salt);
    Ok(PasswordHash { salt, hash })
}

/// Recompute the hash for a password under an already-stored salt.
///
/// Deterministic: the same password and salt always produce the same hash.
#[must_use]
pub fn derive(plaintext: &str, salt: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(plaintext.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derive_reproduces_stored_hash() {
        let stored = hash("correct horse battery staple").unwrap();
        assert_eq!(
            derive("correct horse battery staple", &stored.salt),
            stored.hash
        );
    }

    #[test]
    fn salts_are_fresh_per_call() {
        let first = hash("same password").unwrap();
        let second = hash("same password").unwrap();
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn different_salts_change_the_hash() {
        let stored = hash("secret").unwrap();
        assert_ne!(derive("secret", "AAAAAAAAAAAAAAAAAAAAAA"), stored.hash);
    }

    #[test]
    fn empty_password_is_accepted() {
        let stored = hash("").unwrap();
        assert_eq!(derive("", &stored.salt), stored.hash);
    }

    #[test]
    fn salt_decodes_to_expected_length() {
        let stored = hash("x").unwrap();
        let raw = URL_SAFE_NO_PAD.decode(stored.salt.as_bytes()).unwrap();
        assert_eq!(raw.len(), SALT_BYTES);
    }
}
