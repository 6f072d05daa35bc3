//! Student management web application for Roster.
//!
//! This crate provides an Axum HTTP server that renders:
//!
//! - **Account pages** (`/register`, `/login`, `/logout`) backed by
//!   Argon2 password hashes
//! - **Student management** (`/dashboard`, add/edit/delete, profiles)
//! - **Courses and enrollment** (`/courses`, `/student/{id}/enroll`)
//! - **Static assets** (`/static`), including the compiled
//!   `roster-confirm` bundle that asks for confirmation before a
//!   student is deleted
//!
//! # Architecture
//!
//! Pages are minijinja templates loaded from disk at startup. Each
//! request carries a server-side session (see [`session`]) that holds
//! the logged-in user and pending flash messages. Handlers talk to
//! `SQLite` through the `roster-db` stores.

pub mod config;
pub mod courses;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod password;
pub mod router;
pub mod server;
pub mod session;
pub mod state;
pub mod students;
pub mod templates;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError};
pub use error::WebError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, spawn_session_reaper, start_server};
pub use state::AppState;
