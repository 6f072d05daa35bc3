//! Error types for the data layer.
//!
//! All errors are propagated via [`DbError`]. Constraint violations are
//! split out of the generic [`sqlx::Error`] so callers can turn them into
//! user-facing messages instead of server errors.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `SQLite` operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    /// A migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// An insert or update collided with a `UNIQUE` constraint.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An insert referenced a row that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Classify a [`sqlx::Error`], pulling constraint violations out into
    /// their own variants.
    pub(crate) fn classify(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict(format!("{context}: {}", db_err.message()));
            }
            if db_err.is_foreign_key_violation() {
                return Self::MissingReference(format!("{context}: {}", db_err.message()));
            }
        }
        Self::Sqlite(err)
    }
}
