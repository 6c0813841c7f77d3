//! Questions and answers behind salted-credential accounts and bearer-token
//! sessions. The crate splits into `auth` (credentials, sessions, policy),
//! `store` (persistence contracts plus Postgres and in-memory backends),
//! `service` (per-resource operations that combine the two), and `api` (the
//! HTTP surface), with `cli` wiring it all into a binary.

pub mod api;
pub mod auth;
pub mod cli;
pub mod domain;
pub mod service;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash() {
        assert!(!GIT_COMMIT_HASH.is_empty());
    }

    #[test]
    fn test_app_user_agent() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}
