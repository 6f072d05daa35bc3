//! Error types for the web layer.
//!
//! [`WebError`] unifies all failure modes into a single enum that can be
//! converted into an HTML response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use roster_db::DbError;

/// Errors that can occur while serving a request.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A data layer operation failed.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    Password(String),

    /// An internal invariant was broken.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<minijinja::Error> for WebError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::Database(_) | Self::Template(_) | Self::Password(_) | Self::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_owned(),
                )
            }
        };

        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
             <title>{code}</title></head><body><h1>{code}</h1><p>{message}</p>\
             <p><a href=\"/\">Home</a></p></body></html>",
            code = status.as_u16(),
        );

        (status, Html(body)).into_response()
    }
}
