// Database module for users and carts

pub mod carts;
pub mod users;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::AppError;

pub use carts::{Cart, CartRepository};
pub use users::{NewUser, User, UserRepository, UserUpdate};

pub const MEMORY_DB: &str = ":memory:";

// Initialize database and run migrations
pub async fn init_db(db_path: &str) -> Result<SqlitePool> {
    let pool = if db_path == MEMORY_DB {
        // An in-memory database lives and dies with its connection, so the pool
        // must hold exactly one and never recycle it
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
    } else {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        SqlitePoolOptions::new().connect_with(options).await
    }
    .context("Failed to connect to database")?;

    let migration_sql = include_str!("../../migrations/001_initial_schema.sql");
    sqlx::raw_sql(migration_sql)
        .execute(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!(database = %db_path, "database ready");

    Ok(pool)
}

/// Which uniqueness rule a write ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Mail,
    UserName,
    /// Reported by the storage engine itself, e.g. when two sign-ups race
    Unknown,
}

impl fmt::Display for ConflictField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictField::Mail => write!(f, "mail"),
            ConflictField::UserName => write!(f, "user_name"),
            ConflictField::Unknown => write!(f, "user or mail"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("missing required fields")]
    MissingFields,
    #[error("{0} already exists")]
    Conflict(ConflictField),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] anyhow::Error),
}

impl RepoError {
    /// Translate constraint violations reported by SQLite into domain errors
    pub(crate) fn from_write(err: sqlx::Error, owner: &'static str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Conflict(ConflictField::Unknown)
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::NotFound(owner)
            }
            _ => RepoError::Database(err),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            RepoError::MissingFields => AppError::BadRequest("missing required fields".to_string()),
            RepoError::Conflict(ConflictField::Mail) => AppError::Conflict {
                tag: "mail-exists",
                message: "mail already registered".to_string(),
            },
            RepoError::Conflict(ConflictField::UserName) => AppError::Conflict {
                tag: "username-exists",
                message: "user name already taken".to_string(),
            },
            RepoError::Conflict(ConflictField::Unknown) => AppError::Conflict {
                tag: "error",
                message: "user or mail already exists".to_string(),
            },
            RepoError::Database(e) => AppError::Internal(format!("Database error: {}", e)),
            RepoError::Hashing(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}

/// Trim a field and treat blank input as absent
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
