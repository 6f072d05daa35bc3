//! Shared type definitions for the Roster student manager.
//!
//! # Modules
//!
//! - [`ids`] -- Typed row identifiers
//! - [`structs`] -- Entities and validated write models
//! - [`flash`] -- One-shot flash messages

pub mod flash;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use flash::{Flash, FlashLevel};
pub use ids::{CourseId, StudentId, UserId};
pub use structs::{Course, Credentials, NewCourse, NewStudent, Student, User};
