//! User profile and admin-only user removal endpoints.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{parse_id, require_bearer, ApiError};
use crate::api::state::AppState;
use crate::domain::{Role, User};

/// Public projection of a user. Credential material never leaves the store
/// layer.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "The user profile", body = UserResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "users"
)]
pub async fn profile(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let user_id = parse_id(&id)?;
    let user = state.users.profile(&token, user_id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 403, description = "Admin only", body = String),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "users"
)]
pub async fn delete(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let user_id = parse_id(&id)?;
    let user = state.users.delete(&token, user_id).await?;
    Ok(Json(UserResponse::from(user)))
}
