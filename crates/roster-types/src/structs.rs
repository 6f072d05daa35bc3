//! Entity structs and their validated write models.
//!
//! Read models ([`User`], [`Student`], [`Course`]) mirror table rows.
//! Write models ([`NewStudent`], [`NewCourse`], [`Credentials`]) carry
//! `validator` rules so the web layer can reject bad input before it
//! reaches the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::ids::{CourseId, StudentId, UserId};

/// A registered account allowed to manage students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Row ID.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC-format password hash. Never rendered.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// A student record with optional profile fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Row ID.
    pub id: StudentId,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Grade or class label (free text, e.g. `10A`).
    pub grade: String,
    /// Contact email, unique across students when present.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// A course students can be enrolled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Row ID.
    pub id: CourseId,
    /// Display name.
    pub course_name: String,
    /// Optional longer description.
    pub description: Option<String>,
}

/// Fields needed to create or update a student.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewStudent {
    /// Full name.
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// Age in years.
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: i64,
    /// Grade label.
    #[validate(length(min = 1, max = 50, message = "Grade must be 1-50 characters"))]
    pub grade: String,
    /// Contact email.
    #[validate(
        email(message = "Email address is not valid"),
        length(max = 120, message = "Email must be at most 120 characters")
    )]
    pub email: Option<String>,
    /// Contact phone number.
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    /// Postal address.
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
}

/// Fields needed to create a course.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewCourse {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Course name must be 1-100 characters"))]
    pub course_name: String,
    /// Optional longer description.
    #[validate(length(max = 250, message = "Description must be at most 250 characters"))]
    pub description: Option<String>,
}

/// A username/password pair submitted to register or log in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct Credentials {
    /// Login name.
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,
    /// Plaintext password as submitted. Only ever hashed or verified.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> NewStudent {
        NewStudent {
            name: "Ada Lovelace".to_owned(),
            age: 17,
            grade: "12B".to_owned(),
            email: Some("ada@example.com".to_owned()),
            phone: None,
            address: None,
        }
    }

    #[test]
    fn valid_student_passes() {
        assert!(student().validate().is_ok());
    }

    #[test]
    fn out_of_range_age_is_rejected() {
        let mut s = student();
        s.age = 0;
        let errors = s.validate().err();
        assert!(errors.is_some_and(|e| e.field_errors().contains_key("age")));
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut s = student();
        s.email = Some("not-an-email".to_owned());
        assert!(s.validate().is_err());
    }

    #[test]
    fn missing_email_is_fine() {
        let mut s = student();
        s.email = None;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        let creds = Credentials {
            username: "admin".to_owned(),
            password: String::new(),
        };
        assert!(creds.validate().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: UserId(1),
            username: "admin".to_owned(),
            password_hash: "$argon2id$secret".to_owned(),
        };
        let value = serde_json::to_value(&user).unwrap_or_default();
        assert!(value.get("password_hash").is_none());
    }
}
