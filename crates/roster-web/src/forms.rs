//! Raw HTML form payloads and their conversion into validated write
//! models.
//!
//! Browsers submit every field as a string and send empty inputs as `""`,
//! so the payloads here are all strings. Conversion trims, maps blanks to
//! `None`, parses numbers, and runs the `validator` rules. Failures come
//! back as a single user-facing message.

use roster_types::{CourseId, Credentials, NewCourse, NewStudent};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

/// Submitted add/edit student form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentForm {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Age as typed.
    #[serde(default)]
    pub age: String,
    /// Grade label.
    #[serde(default)]
    pub grade: String,
    /// Optional email.
    #[serde(default)]
    pub email: String,
    /// Optional phone.
    #[serde(default)]
    pub phone: String,
    /// Optional address.
    #[serde(default)]
    pub address: String,
}

impl StudentForm {
    /// Parse and validate into a [`NewStudent`].
    pub fn into_student(self) -> Result<NewStudent, String> {
        let Ok(age) = self.age.trim().parse::<i64>() else {
            return Err("Age must be a whole number".to_owned());
        };
        let student = NewStudent {
            name: self.name.trim().to_owned(),
            age,
            grade: self.grade.trim().to_owned(),
            email: blank_to_none(&self.email),
            phone: blank_to_none(&self.phone),
            address: blank_to_none(&self.address),
        };
        student.validate().map_err(|e| first_message(&e))?;
        Ok(student)
    }
}

/// Submitted add-course form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseForm {
    /// Display name.
    #[serde(default)]
    pub course_name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
}

impl CourseForm {
    /// Validate into a [`NewCourse`].
    pub fn into_course(self) -> Result<NewCourse, String> {
        let course = NewCourse {
            course_name: self.course_name.trim().to_owned(),
            description: blank_to_none(&self.description),
        };
        course.validate().map_err(|e| first_message(&e))?;
        Ok(course)
    }
}

/// Submitted enrollment form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollForm {
    /// Course to enroll in, as submitted.
    #[serde(default)]
    pub course_id: String,
}

impl EnrollForm {
    /// The selected course, `None` if the field is missing or not a
    /// number.
    pub fn course(&self) -> Option<CourseId> {
        self.course_id.trim().parse().ok().map(CourseId)
    }
}

/// Validate submitted credentials, trimming the username.
pub fn check_credentials(mut credentials: Credentials) -> Result<Credentials, String> {
    credentials.username = credentials.username.trim().to_owned();
    credentials.validate().map_err(|e| first_message(&e))?;
    Ok(credentials)
}

fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// The message of the first failing rule, ordered by field name so the
/// result is deterministic.
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |err| (field.clone(), err)))
        .map(|(field, err)| {
            err.message
                .as_ref()
                .map_or_else(|| format!("Invalid {field}"), ToString::to_string)
        })
        .next()
        .unwrap_or_else(|| "Invalid input".to_owned())
}
