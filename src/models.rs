//! Domain types and their SQLite repositories.
//!
//! The repositories translate storage-level conditions into the application's
//! error taxonomy: a missing row becomes [`AppError::NotFound`], a violated
//! email uniqueness constraint becomes [`AppError::DuplicateEmail`] and a
//! failed login becomes [`AppError::InvalidCredentials`]. Anything else is a
//! fault and propagates as [`AppError::Internal`].

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};

const BCRYPT_COST: u32 = 12;

/// Number of snippets shown on the home page.
pub const LATEST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Creation time, unix epoch seconds (UTC).
    pub created: i64,
    /// Expiry time, unix epoch seconds (UTC).
    pub expires: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created: i64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct SnippetRepo {
    db: SqlitePool,
}

impl SnippetRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Inserts a new snippet expiring `expires_days` from now and returns its id.
    pub async fn insert(&self, title: &str, content: &str, expires_days: i64) -> AppResult<i64> {
        let now = Utc::now().timestamp();
        let expires = now + expires_days * 86_400;
        let result = sqlx::query(
            "INSERT INTO snippets (title, content, created, expires) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(title)
        .bind(content)
        .bind(now)
        .bind(expires)
        .execute(&self.db)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Fetches a single unexpired snippet. Expired or absent rows are `NotFound`.
    pub async fn get(&self, id: i64) -> AppResult<Snippet> {
        let snippet = sqlx::query_as::<_, Snippet>(
            "SELECT id, title, content, created, expires FROM snippets WHERE expires > ?1 AND id = ?2",
        )
        .bind(Utc::now().timestamp())
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        snippet.ok_or(AppError::NotFound)
    }

    /// Returns the most recently created unexpired snippets.
    ///
    /// `id DESC` is the explicit tie-break for equal `created` timestamps so
    /// the ordering is deterministic.
    pub async fn latest(&self) -> AppResult<Vec<Snippet>> {
        let snippets = sqlx::query_as::<_, Snippet>(
            "SELECT id, title, content, created, expires FROM snippets \
             WHERE expires > ?1 ORDER BY created DESC, id DESC LIMIT ?2",
        )
        .bind(Utc::now().timestamp())
        .bind(LATEST_LIMIT)
        .fetch_all(&self.db)
        .await?;
        Ok(snippets)
    }
}

#[derive(Debug, Clone)]
pub struct UserRepo {
    db: SqlitePool,
}

impl UserRepo {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Inserts a new user with a bcrypt-hashed password.
    ///
    /// A violated uniqueness constraint on the email column is reported as
    /// `DuplicateEmail` so the signup form can attach a field-level message.
    pub async fn insert(&self, name: &str, email: &str, password: &str) -> AppResult<()> {
        let hashed = bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("hashing password")))?;

        let result = sqlx::query(
            "INSERT INTO users (name, email, hashed_password, created) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(name)
        .bind(email)
        .bind(hashed)
        .bind(Utc::now().timestamp())
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("users.email") => {
                Err(AppError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies email and password, returning the user id on success.
    ///
    /// Unknown email, wrong password and deactivated accounts are all reported
    /// uniformly as `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<i64> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, hashed_password, created, active FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.active {
            return Err(AppError::InvalidCredentials);
        }
        let matches = bcrypt::verify(password, &user.hashed_password)
            .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("verifying password")))?;
        if !matches {
            return Err(AppError::InvalidCredentials);
        }
        Ok(user.id)
    }

    /// Fetches a user by id. Absence is `Ok(None)`, not an error, because the
    /// authentication interceptor treats a stale session id as "unauthenticated"
    /// rather than as a failure.
    pub async fn get(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, hashed_password, created, active FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
