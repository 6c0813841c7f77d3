//! Signup, signin, and signout endpoints.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{require_bearer, valid_email, ApiError};
use crate::api::state::AppState;
use crate::auth::{registration, Signup};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SigninRequest {
    pub username: String,
    #[schema(value_type = String)]
    pub password: SecretString,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SigninResponse {
    pub id: Uuid,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignoutResponse {
    pub id: Uuid,
}

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = SignupResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Username or email already taken", body = String)
    ),
    tag = "auth"
)]
pub async fn signup(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let username = request.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::BadRequest("Invalid username"));
    }

    let email = registration::normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email"));
    }

    let user = state
        .registrar
        .register(Signup {
            username,
            email,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            password: request.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/v1/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Session issued", body = SigninResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Unknown username or wrong password", body = String)
    ),
    tag = "auth"
)]
pub async fn signin(
    state: Extension<Arc<AppState>>,
    payload: Option<Json<SigninRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::BadRequest("Missing payload"));
    };

    let signed_in = state
        .sessions
        .sign_in(request.username.trim(), &request.password)
        .await?;

    Ok(Json(SigninResponse {
        id: signed_in.user.id,
        access_token: signed_in.token,
        expires_at: signed_in.expires_at,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/signout",
    params(
        ("Authorization" = String, Header, description = "Bearer access token")
    ),
    responses(
        (status = 200, description = "Session ended", body = SignoutResponse),
        (status = 401, description = "Not signed in", body = String)
    ),
    tag = "auth"
)]
pub async fn signout(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let session = state.sessions.sign_out(&token).await?;

    Ok(Json(SignoutResponse {
        id: session.user_id,
    }))
}
