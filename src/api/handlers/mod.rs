//! Route handlers and the shared HTTP error mapping.

pub mod answers;
pub mod auth;
pub mod health;
pub mod questions;
pub mod users;

use crate::auth::Error as AuthError;
use crate::service::{AnswerError, QuestionError, UserError};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use regex::Regex;
use tracing::error;

/// Lightweight email sanity check applied before persisting a signup.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Require a bearer token; a missing header reads the same as an unknown
/// token so auth state is never leaked by the error shape.
pub(crate) fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    extract_bearer_token(headers).ok_or(ApiError::Auth(AuthError::NotSignedIn))
}

/// HTTP-facing error shape. Every service error funnels through here so the
/// status mapping lives in exactly one place.
#[derive(Debug)]
pub(crate) enum ApiError {
    Auth(AuthError),
    NotFound(String),
    BadRequest(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => {
                let status = match &err {
                    AuthError::DuplicateUsername | AuthError::DuplicateEmail => {
                        StatusCode::CONFLICT
                    }
                    AuthError::UnknownUsername
                    | AuthError::BadCredentials
                    | AuthError::NotSignedIn
                    | AuthError::SignedOut
                    | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
                    AuthError::Denied(_) => StatusCode::FORBIDDEN,
                    AuthError::Store(source) => {
                        // Infrastructure detail stays in the logs, not the response.
                        error!("storage failure: {source}");
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                };
                (status, err.to_string()).into_response()
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<QuestionError> for ApiError {
    fn from(err: QuestionError) -> Self {
        match err {
            QuestionError::Auth(inner) => Self::Auth(inner),
            other => Self::NotFound(other.to_string()),
        }
    }
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::Auth(inner) => Self::Auth(inner),
            other => Self::NotFound(other.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Auth(inner) => Self::Auth(inner),
            other => Self::NotFound(other.to_string()),
        }
    }
}

/// Parse a path segment as a uuid, rejecting garbage up front.
pub(crate) fn parse_id(raw: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest("Invalid id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn bearer_extraction_handles_prefix_and_whitespace() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer  abc123 "));
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(extract_bearer_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn bearer_extraction_rejects_other_schemes_and_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&uuid::Uuid::new_v4().to_string()).is_ok());
    }
}
