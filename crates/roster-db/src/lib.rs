//! `SQLite` data layer for the Roster student manager.
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool, configuration, and migrations
//! - [`user_store`] -- Account lookup and creation
//! - [`student_store`] -- Student CRUD
//! - [`course_store`] -- Courses and enrollments
//! - [`error`] -- Shared error types

pub mod course_store;
pub mod error;
pub mod sqlite;
pub mod student_store;
pub mod user_store;

// Re-export primary types for convenience.
pub use course_store::{CourseRow, CourseStore};
pub use error::DbError;
pub use sqlite::{Database, DatabaseConfig};
pub use student_store::{StudentRow, StudentStore};
pub use user_store::{UserRow, UserStore};
