//! Answer operations, scoped to an existing question.

use crate::auth::{self, authorize, Access, SessionManager};
use crate::domain::Answer;
use crate::store::{AnswerStore, QuestionStore};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("entered answer uuid does not exist")]
    NotFound,
    #[error("entered question uuid does not exist")]
    QuestionNotFound,
    #[error(transparent)]
    Auth(#[from] auth::Error),
}

#[derive(Clone)]
pub struct AnswerService {
    sessions: SessionManager,
    answers: Arc<dyn AnswerStore>,
    questions: Arc<dyn QuestionStore>,
}

impl AnswerService {
    #[must_use]
    pub fn new(
        sessions: SessionManager,
        answers: Arc<dyn AnswerStore>,
        questions: Arc<dyn QuestionStore>,
    ) -> Self {
        Self {
            sessions,
            answers,
            questions,
        }
    }

    /// Answer an existing question; the answer is owned by the caller.
    pub async fn create(
        &self,
        token: &str,
        question_id: Uuid,
        content: String,
    ) -> Result<Answer, AnswerError> {
        let actor = self.sessions.resolve_user(token).await?;
        if self
            .questions
            .find_by_id(question_id)
            .await
            .map_err(auth::Error::from)?
            .is_none()
        {
            return Err(AnswerError::QuestionNotFound);
        }
        Ok(self
            .answers
            .insert(question_id, actor.id, content)
            .await
            .map_err(auth::Error::from)?)
    }

    pub async fn get(&self, token: &str, id: Uuid) -> Result<Answer, AnswerError> {
        self.sessions.resolve_user(token).await?;
        self.answers
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(AnswerError::NotFound)
    }

    /// List all answers to a question.
    pub async fn by_question(
        &self,
        token: &str,
        question_id: Uuid,
    ) -> Result<Vec<Answer>, AnswerError> {
        self.sessions.resolve_user(token).await?;
        if self
            .questions
            .find_by_id(question_id)
            .await
            .map_err(auth::Error::from)?
            .is_none()
        {
            return Err(AnswerError::QuestionNotFound);
        }
        Ok(self
            .answers
            .by_question(question_id)
            .await
            .map_err(auth::Error::from)?)
    }

    /// Edit an answer's content. Owner-exclusive: admins are denied too.
    pub async fn edit(
        &self,
        token: &str,
        id: Uuid,
        content: String,
    ) -> Result<Answer, AnswerError> {
        let actor = self.sessions.resolve_user(token).await?;
        let answer = self
            .answers
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(AnswerError::NotFound)?;
        authorize(&actor, answer.user_id, Access::OwnerOnly).map_err(auth::Error::Denied)?;
        self.answers
            .update_content(id, content, Utc::now())
            .await
            .map_err(auth::Error::from)?
            .ok_or(AnswerError::NotFound)
    }

    /// Delete an answer; the owner or any admin may.
    pub async fn delete(&self, token: &str, id: Uuid) -> Result<Answer, AnswerError> {
        let actor = self.sessions.resolve_user(token).await?;
        let answer = self
            .answers
            .find_by_id(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(AnswerError::NotFound)?;
        authorize(&actor, answer.user_id, Access::OwnerOrAdmin).map_err(auth::Error::Denied)?;
        self.answers
            .delete(id)
            .await
            .map_err(auth::Error::from)?
            .ok_or(AnswerError::NotFound)
    }
}
