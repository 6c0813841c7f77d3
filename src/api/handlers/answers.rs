//! Answer CRUD endpoints, nested under their question where it reads best.

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
use crate::domain::Answer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResponse {
    pub id: Uuid,
    pub question_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Answer> for AnswerResponse {
    fn from(answer: Answer) -> Self {
        Self {
            id: answer.id,
            question_id: answer.question_id,
            user_id: answer.user_id,
            content: answer.content,
            created_at: answer.created_at,
            updated_at: answer.updated_at,
        }
    }
}

fn validated_content(request: Option<Json<AnswerRequest>>) -> Result<String, ApiError> {
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
    path = "/v1/questions/{id}/answers",
    request_body = AnswerRequest,
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 201, description = "Answer created", body = AnswerResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such question", body = String)
    ),
    tag = "answers"
)]
pub async fn create(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Option<Json<AnswerRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let question_id = parse_id(&id)?;
    let content = validated_content(payload)?;
    let answer = state.answers.create(&token, question_id, content).await?;
    Ok((StatusCode::CREATED, Json(AnswerResponse::from(answer))))
}

#[utoipa::path(
    get,
    path = "/v1/questions/{id}/answers",
    params(
        ("id" = Uuid, Path, description = "Question id")
    ),
    responses(
        (status = 200, description = "Answers to the question", body = [AnswerResponse]),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such question", body = String)
    ),
    tag = "answers"
)]
pub async fn by_question(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let question_id = parse_id(&id)?;
    let answers = state.answers.by_question(&token, question_id).await?;
    Ok(Json(
        answers
            .into_iter()
            .map(AnswerResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/v1/answers/{id}",
    params(
        ("id" = Uuid, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "The answer", body = AnswerResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 404, description = "No such answer", body = String)
    ),
    tag = "answers"
)]
pub async fn get(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let answer = state.answers.get(&token, id).await?;
    Ok(Json(AnswerResponse::from(answer)))
}

#[utoipa::path(
    put,
    path = "/v1/answers/{id}",
    request_body = AnswerRequest,
    params(
        ("id" = Uuid, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer updated", body = AnswerResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 403, description = "Only the owner may edit", body = String),
        (status = 404, description = "No such answer", body = String)
    ),
    tag = "answers"
)]
pub async fn edit(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Option<Json<AnswerRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let content = validated_content(payload)?;
    let answer = state.answers.edit(&token, id, content).await?;
    Ok(Json(AnswerResponse::from(answer)))
}

#[utoipa::path(
    delete,
    path = "/v1/answers/{id}",
    params(
        ("id" = Uuid, Path, description = "Answer id")
    ),
    responses(
        (status = 200, description = "Answer deleted", body = AnswerResponse),
        (status = 401, description = "Not signed in", body = String),
        (status = 403, description = "Owner or admin only", body = String),
        (status = 404, description = "No such answer", body = String)
    ),
    tag = "answers"
)]
pub async fn delete(
    state: Extension<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let token = require_bearer(&headers)?;
    let id = parse_id(&id)?;
    let answer = state.answers.delete(&token, id).await?;
    Ok(Json(AnswerResponse::from(answer)))
}
