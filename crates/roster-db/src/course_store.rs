//! Course persistence and student enrollment.

use roster_types::{Course, CourseId, NewCourse, StudentId};
use sqlx::SqlitePool;

use crate::error::DbError;

/// A row from the `courses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseRow {
    /// Row ID.
    pub id: i64,
    /// Display name.
    pub course_name: String,
    /// Optional description.
    pub description: Option<String>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: CourseId(row.id),
            course_name: row.course_name,
            description: row.description,
        }
    }
}

/// Operations on the `courses` and `enrollments` tables.
pub struct CourseStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CourseStore<'a> {
    /// Create a new course store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every course ordered by name.
    pub async fn list(&self) -> Result<Vec<Course>, DbError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            "SELECT id, course_name, description FROM courses ORDER BY course_name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }

    /// Insert a course and return the stored record.
    pub async fn insert(&self, course: &NewCourse) -> Result<Course, DbError> {
        let result = sqlx::query("INSERT INTO courses (course_name, description) VALUES (?, ?)")
            .bind(&course.course_name)
            .bind(&course.description)
            .execute(self.pool)
            .await?;

        let id = CourseId(result.last_insert_rowid());
        tracing::debug!(%id, course_name = %course.course_name, "Inserted course");

        Ok(Course {
            id,
            course_name: course.course_name.clone(),
            description: course.description.clone(),
        })
    }

    /// Enroll a student in a course.
    ///
    /// Returns `true` if a new enrollment was recorded and `false` if the
    /// student was already enrolled.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingReference`] if either ID does not exist.
    pub async fn enroll(&self, student: StudentId, course: CourseId) -> Result<bool, DbError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO enrollments (student_id, course_id) VALUES (?, ?)",
        )
        .bind(student.into_inner())
        .bind(course.into_inner())
        .execute(self.pool)
        .await
        .map_err(|e| DbError::classify(e, "unknown student or course"))?;

        let added = result.rows_affected() > 0;
        tracing::debug!(%student, %course, added, "Enrollment recorded");
        Ok(added)
    }

    /// List the courses a student is enrolled in, ordered by name.
    pub async fn courses_for_student(&self, student: StudentId) -> Result<Vec<Course>, DbError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            "SELECT c.id, c.course_name, c.description
             FROM courses c
             JOIN enrollments e ON e.course_id = c.id
             WHERE e.student_id = ?
             ORDER BY c.course_name, c.id",
        )
        .bind(student.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Course::from).collect())
    }
}
