//! Account persistence for the `users` table.

use roster_types::{User, UserId};
use sqlx::SqlitePool;

use crate::error::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Row ID.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC-format hash.
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

/// Operations on the `users` table.
pub struct UserStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserStore<'a> {
    /// Create a new user store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if the username is taken.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<User, DbError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::classify(e, "username already exists"))?;

        let id = UserId(result.last_insert_rowid());
        tracing::debug!(%id, username, "Created user");

        Ok(User {
            id,
            username: username.to_owned(),
            password_hash: password_hash.to_owned(),
        })
    }

    /// Look up an account by its login name.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
