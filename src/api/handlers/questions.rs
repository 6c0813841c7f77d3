//! Question CRUD endpoints. Every route requires a live session.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{parse_id, require_bearer, ApiError};
use crate::api::state::AppState;
use crate::domain::Question;

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Question> for QuestionResponse {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            user_id: question.user_id,
            content: question.content,
            created_at: question.created_at,
            updated_at: question.updated_at,
        }
    }
}

fn validated_content(request: Option<Json<QuestionRequest>>) -> Result<String, ApiError> {
    let Some(Json(request)) = request else {
        return Err(ApiError::BadRequest("Missing payload"));
    };
    let content = request.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Empty content"));
    }
    Ok(content)
}

#[utoipa::path(
    post,
    path = "/v1/questions",
    request_body = QuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Not signed in", body = String)
    ),
    tag = "questions"
)]
pub async fn create(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    payload: Option<Json<QuestionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let content = validated_content(payload)?;
    let question = state.questions.create(&token, content).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

#[utoipa::path(
    get,
    path = "/v1/questions",
    responses(
        (status = 200, description = "All questions", body = [QuestionResponse]),
        (status = 401, description = "Not signed in", body = String)
    ),
    tag = "questions"
)]
pub async fn all(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let questions = state.questions.all(&token).await?;
    Ok(Json(
        questions
            .into_iter()
            .map(QuestionResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "The question", body = QuestionResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such question", body = String)
    ),
    tag = "questions"
)]
pub async fn get(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let question = state.questions.get(&token, id).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    put,
    path = "/v1/questions/{id}",
    request_body = QuestionRequest,
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question updated", body = QuestionResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 403, description = "Only the owner may edit", body = String),
        (status = 404, description = "No such question", body = String)
    ),
    tag = "questions"
)]
pub async fn edit(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Option<Json<QuestionRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let content = validated_content(payload)?;
    let question = state.questions.edit(&token, id, content).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    delete,
    path = "/v1/questions/{id}",
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Question deleted", body = QuestionResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 403, description = "Owner or admin only", body = String),
        (status = 404, description = "No such question", body = String)
    ),
    tag = "questions"
)]
pub async fn delete(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let question = state.questions.delete(&token, id).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}/questions",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Questions posted by the user", body = [QuestionResponse]),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "questions"
)]
pub async fn by_user(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let user_id = parse_id(&id)?;
    let questions = state.questions.by_user(&token, user_id).await?;
    Ok(Json(
        questions
            .into_iter()
            .map(QuestionResponse::from)
            .collect::<Vec<_>>(),
    ))
}
