//! Bearer token generation and storage hashing.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Mint a new opaque bearer token.
///
/// 32 bytes from the OS RNG, so tokens are unpredictable and never
/// sequential. The raw value is only ever handed to the caller; storage
/// sees the hash.
///
/// # Errors
/// Returns an error if the operating system RNG fails.
pub fn generate() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a bearer token so raw values never touch the database.
/// The hash is the session lookup key when a token is presented.
#[must_use]
pub fn token_hash(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct() {
        assert_ne!(generate().unwrap(), generate().unwrap());
    }

    #[test]
    fn token_decodes_to_32_bytes() {
        let token = generate().unwrap();
        let raw = URL_SAFE_NO_PAD.decode(token.as_bytes()).unwrap();
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn token_hash_stable() {
        let first = token_hash("token");
        let second = token_hash("token");
        let different = token_hash("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
    }
}
