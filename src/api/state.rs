//! Shared application state handed to every handler.

use crate::auth::{Registrar, SessionManager};
use crate::service::{AnswerService, QuestionService, UserService};
use crate::store::{AnswerStore, QuestionStore, SessionStore, UserStore};
use std::sync::Arc;

/// One instance per process, wired once at startup and shared through an
/// axum `Extension`.
pub struct AppState {
    pub registrar: Registrar,
    pub sessions: SessionManager,
    pub questions: QuestionService,
    pub answers: AnswerService,
    pub users: UserService,
}

impl AppState {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        questions: Arc<dyn QuestionStore>,
        answers: Arc<dyn AnswerStore>,
        session_ttl_seconds: i64,
    ) -> Self {
        let manager =
            SessionManager::new(users.clone(), sessions).with_ttl_seconds(session_ttl_seconds);
        Self {
            registrar: Registrar::new(users.clone()),
            questions: QuestionService::new(manager.clone(), questions.clone(), users.clone()),
            answers: AnswerService::new(manager.clone(), answers, questions),
            users: UserService::new(manager.clone(), users),
            sessions: manager,
        }
    }
}
