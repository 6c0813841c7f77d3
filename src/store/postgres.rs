//! Postgres storage backend.
//!
//! Runtime sqlx queries, each instrumented with a `db.query` span. The
//! `users` unique constraints and the `sessions` primary key are the real
//! uniqueness guarantees; violations surface as explicit outcomes so the
//! flows above never have to trust a prior read. Schema DDL lives under
//! `migrations/`.

use super::{
    AnswerStore, QuestionStore, SessionInsert, SessionStore, StoreError, UserInsert, UserStore,
};
use crate::domain::{Answer, NewSession, NewUser, Question, Role, Session, User};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Name of the violated unique constraint, if the error is one.
fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().is_some_and(|code| code.as_ref() == "23505") => {
            db_err.constraint().map(str::to_string)
        }
        _ => None,
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.get("role");
    let role = Role::parse(&role)
        .ok_or_else(|| StoreError::from(anyhow!("unknown role in users table: {role}")))?;
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role,
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        created_at: row.get("created_at"),
    })
}

fn session_from_row(row: &PgRow) -> Session {
    Session {
        token_hash: row.get("token_hash"),
        user_id: row.get("user_id"),
        login_at: row.get("login_at"),
        expires_at: row.get("expires_at"),
        logout_at: row.get("logout_at"),
    }
}

fn question_from_row(row: &PgRow) -> Question {
    Question {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn answer_from_row(row: &PgRow) -> Answer {
    Answer {
        id: row.get("id"),
        question_id: row.get("question_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgStore {
    async fn find_user_where(
        &self,
        statement: &'static str,
        bind: &str,
    ) -> Result<Option<User>, StoreError> {
        let span = query_span("SELECT", statement);
        let row = sqlx::query(statement)
            .bind(bind)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where(
            r"
            SELECT id, username, email, first_name, last_name, role,
                   password_hash, password_salt, created_at
            FROM users WHERE username = $1
            ",
            username,
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_user_where(
            r"
            SELECT id, username, email, first_name, last_name, role,
                   password_hash, password_salt, created_at
            FROM users WHERE email = $1
            ",
            email,
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let statement = r"
            SELECT id, username, email, first_name, last_name, role,
                   password_hash, password_salt, created_at
            FROM users WHERE id = $1
        ";
        let span = query_span("SELECT", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<UserInsert, StoreError> {
        let statement = r"
            INSERT INTO users
                (username, email, first_name, last_name, role, password_hash, password_salt)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, first_name, last_name, role,
                      password_hash, password_salt, created_at
        ";
        let span = query_span("INSERT", statement);
        let result = sqlx::query(statement)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .bind(&user.password_salt)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => Ok(UserInsert::Created(user_from_row(&row)?)),
            Err(err) => match unique_violation(&err).as_deref() {
                Some(USERNAME_CONSTRAINT) => Ok(UserInsert::DuplicateUsername),
                Some(EMAIL_CONSTRAINT) => Ok(UserInsert::DuplicateEmail),
                _ => Err(anyhow::Error::from(err)
                    .context("failed to insert user")
                    .into()),
            },
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let statement = r"
            DELETE FROM users WHERE id = $1
            RETURNING id, username, email, first_name, last_name, role,
                      password_hash, password_salt, created_at
        ";
        let span = query_span("DELETE", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete user")?;
        row.as_ref().map(user_from_row).transpose()
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn insert(&self, session: NewSession) -> Result<SessionInsert, StoreError> {
        let statement = r"
            INSERT INTO sessions (token_hash, user_id, login_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING token_hash, user_id, login_at, expires_at, logout_at
        ";
        let span = query_span("INSERT", statement);
        let result = sqlx::query(statement)
            .bind(&session.token_hash)
            .bind(session.user_id)
            .bind(session.login_at)
            .bind(session.expires_at)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => Ok(SessionInsert::Created(session_from_row(&row))),
            Err(err) if unique_violation(&err).is_some() => Ok(SessionInsert::DuplicateToken),
            Err(err) => Err(anyhow::Error::from(err)
                .context("failed to insert session")
                .into()),
        }
    }

    async fn find_by_token_hash(&self, token_hash: &[u8]) -> Result<Option<Session>, StoreError> {
        let statement = r"
            SELECT token_hash, user_id, login_at, expires_at, logout_at
            FROM sessions WHERE token_hash = $1
        ";
        let span = query_span("SELECT", statement);
        let row = sqlx::query(statement)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;
        Ok(row.as_ref().map(session_from_row))
    }

    async fn mark_logged_out(
        &self,
        token_hash: &[u8],
        at: DateTime<Utc>,
    ) -> Result<Option<Session>, StoreError> {
        // logout_at is set-once; the IS NULL guard keeps the transition
        // one-way even under concurrent sign-out requests.
        let statement = r"
            UPDATE sessions
            SET logout_at = $2
            WHERE token_hash = $1 AND logout_at IS NULL
            RETURNING token_hash, user_id, login_at, expires_at, logout_at
        ";
        let span = query_span("UPDATE", statement);
        let row = sqlx::query(statement)
            .bind(token_hash)
            .bind(at)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to mark session logged out")?;
        Ok(row.as_ref().map(session_from_row))
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn insert(&self, user_id: Uuid, content: String) -> Result<Question, StoreError> {
        let statement = r"
            INSERT INTO questions (user_id, content)
            VALUES ($1, $2)
            RETURNING id, user_id, content, created_at, updated_at
        ";
        let span = query_span("INSERT", statement);
        let row = sqlx::query(statement)
            .bind(user_id)
            .bind(&content)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert question")?;
        Ok(question_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        let statement = r"
            SELECT id, user_id, content, created_at, updated_at
            FROM questions WHERE id = $1
        ";
        let span = query_span("SELECT", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup question")?;
        Ok(row.as_ref().map(question_from_row))
    }

    async fn all(&self) -> Result<Vec<Question>, StoreError> {
        let statement = r"
            SELECT id, user_id, content, created_at, updated_at
            FROM questions ORDER BY created_at
        ";
        let span = query_span("SELECT", statement);
        let rows = sqlx::query(statement)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list questions")?;
        Ok(rows.iter().map(question_from_row).collect())
    }

    async fn by_user(&self, user_id: Uuid) -> Result<Vec<Question>, StoreError> {
        let statement = r"
            SELECT id, user_id, content, created_at, updated_at
            FROM questions WHERE user_id = $1 ORDER BY created_at
        ";
        let span = query_span("SELECT", statement);
        let rows = sqlx::query(statement)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list questions by user")?;
        Ok(rows.iter().map(question_from_row).collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, StoreError> {
        let statement = r"
            UPDATE questions
            SET content = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, user_id, content, created_at, updated_at
        ";
        let span = query_span("UPDATE", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .bind(&content)
            .bind(at)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to update question")?;
        Ok(row.as_ref().map(question_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Question>, StoreError> {
        let statement = r"
            DELETE FROM questions WHERE id = $1
            RETURNING id, user_id, content, created_at, updated_at
        ";
        let span = query_span("DELETE", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete question")?;
        Ok(row.as_ref().map(question_from_row))
    }
}

#[async_trait]
impl AnswerStore for PgStore {
    async fn insert(
        &self,
        question_id: Uuid,
        user_id: Uuid,
        content: String,
    ) -> Result<Answer, StoreError> {
        let statement = r"
            INSERT INTO answers (question_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, question_id, user_id, content, created_at, updated_at
        ";
        let span = query_span("INSERT", statement);
        let row = sqlx::query(statement)
            .bind(question_id)
            .bind(user_id)
            .bind(&content)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert answer")?;
        Ok(answer_from_row(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Answer>, StoreError> {
        let statement = r"
            SELECT id, question_id, user_id, content, created_at, updated_at
            FROM answers WHERE id = $1
        ";
        let span = query_span("SELECT", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup answer")?;
        Ok(row.as_ref().map(answer_from_row))
    }

    async fn by_question(&self, question_id: Uuid) -> Result<Vec<Answer>, StoreError> {
        let statement = r"
            SELECT id, question_id, user_id, content, created_at, updated_at
            FROM answers WHERE question_id = $1 ORDER BY created_at
        ";
        let span = query_span("SELECT", statement);
        let rows = sqlx::query(statement)
            .bind(question_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list answers")?;
        Ok(rows.iter().map(answer_from_row).collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        content: String,
        at: DateTime<Utc>,
    ) -> Result<Option<Answer>, StoreError> {
        let statement = r"
            UPDATE answers
            SET content = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, question_id, user_id, content, created_at, updated_at
        ";
        let span = query_span("UPDATE", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .bind(&content)
            .bind(at)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to update answer")?;
        Ok(row.as_ref().map(answer_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Answer>, StoreError> {
        let statement = r"
            DELETE FROM answers WHERE id = $1
            RETURNING id, question_id, user_id, content, created_at, updated_at
        ";
        let span = query_span("DELETE", statement);
        let row = sqlx::query(statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete answer")?;
        Ok(row.as_ref().map(answer_from_row))
    }
}
