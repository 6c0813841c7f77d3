//! Resource services for questions, answers, and user management.
//!
//! Every protected operation resolves the bearer token through the session
//! manager first, then applies the authorization policy where the target is
//! owned, and only then touches the store. Missing targets are
//! `NotFound`-class errors, distinct from authorization failures.

pub mod answers;
pub mod questions;
pub mod users;

pub use answers::{AnswerError, AnswerService};
pub use questions::{QuestionError, QuestionService};
pub use users::{UserError, UserService};
