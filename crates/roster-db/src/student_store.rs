//! Student persistence for the `students` table.
//!
//! Deleting a student also removes their enrollments through the
//! `ON DELETE CASCADE` foreign key on `enrollments.student_id`.

use chrono::{DateTime, Utc};
use roster_types::{NewStudent, Student, StudentId};
use sqlx::SqlitePool;

use crate::error::DbError;

/// Columns selected for every student read.
const STUDENT_COLUMNS: &str = "id, name, age, grade, email, phone, address, created_at";

/// A row from the `students` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentRow {
    /// Row ID.
    pub id: i64,
    /// Full name.
    pub name: String,
    /// Age in years.
    pub age: i64,
    /// Grade label.
    pub grade: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: StudentId(row.id),
            name: row.name,
            age: row.age,
            grade: row.grade,
            email: row.email,
            phone: row.phone,
            address: row.address,
            created_at: row.created_at,
        }
    }
}

/// Operations on the `students` table.
pub struct StudentStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StudentStore<'a> {
    /// Create a new student store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every student in insertion order.
    pub async fn list(&self) -> Result<Vec<Student>, DbError> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Student::from).collect())
    }

    /// Fetch one student, or `None` if the ID is unknown.
    pub async fn get(&self, id: StudentId) -> Result<Option<Student>, DbError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?"
        ))
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Student::from))
    }

    /// Insert a student and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if the email belongs to another student.
    pub async fn insert(&self, student: &NewStudent) -> Result<Student, DbError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO students (name, age, grade, email, phone, address, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&student.name)
        .bind(student.age)
        .bind(&student.grade)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::classify(e, "email already in use"))?;

        let id = StudentId(result.last_insert_rowid());
        tracing::debug!(%id, name = %student.name, "Inserted student");

        Ok(Student {
            id,
            name: student.name.clone(),
            age: student.age,
            grade: student.grade.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            address: student.address.clone(),
            created_at,
        })
    }

    /// Overwrite a student's fields. Returns `false` if the ID is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Conflict`] if the email belongs to another student.
    pub async fn update(&self, id: StudentId, student: &NewStudent) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE students
             SET name = ?, age = ?, grade = ?, email = ?, phone = ?, address = ?
             WHERE id = ?",
        )
        .bind(&student.name)
        .bind(student.age)
        .bind(&student.grade)
        .bind(&student.email)
        .bind(&student.phone)
        .bind(&student.address)
        .bind(id.into_inner())
        .execute(self.pool)
        .await
        .map_err(|e| DbError::classify(e, "email already in use"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a student. Returns `false` if the ID is unknown.
    pub async fn delete(&self, id: StudentId) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        tracing::debug!(%id, removed, "Deleted student");
        Ok(removed)
    }
}
