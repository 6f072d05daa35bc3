//! Student management handlers. All require a logged-in user.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/dashboard` | List students |
//! | `GET` | `/add_student` | Blank student form |
//! | `POST` | `/add_student` | Create a student |
//! | `GET` | `/edit_student/{id}` | Pre-filled student form |
//! | `POST` | `/edit_student/{id}` | Update a student |
//! | `POST` | `/delete_student/{id}` | Delete a student |
//! | `GET` | `/student/{id}` | Profile with enrolled courses |
//! | `POST` | `/student/{id}/enroll` | Enroll in a course |
//!
//! The dashboard renders each delete action as a `delete-btn` submit
//! button inside its own `POST` form, which is what the browser-side
//! confirmation binder attaches to.

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::response::Response;
use minijinja::context;
use roster_db::{CourseStore, DbError, StudentStore};
use roster_types::{Flash, Student, StudentId};

use crate::error::WebError;
use crate::forms::{EnrollForm, StudentForm};
use crate::session::CurrentUser;
use crate::state::AppState;

const EMAIL_TAKEN: &str = "Email already in use by another student";
const UNKNOWN_COURSE: &str = "Unknown course";

/// `GET /dashboard`
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Response, WebError> {
    let students = StudentStore::new(state.db.pool()).list().await?;
    state
        .render(&user.session, "dashboard.html", context! { students => students })
        .await
}

/// `GET /add_student`
pub async fn add_student_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Response, WebError> {
    state
        .render(
            &user.session,
            "student_form.html",
            context! {
                title => "Add Student",
                action => "/add_student",
                student => Option::<Student>::None,
            },
        )
        .await
}

/// `POST /add_student`
pub async fn add_student(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<StudentForm>,
) -> Result<Response, WebError> {
    let new_student = match form.into_student() {
        Ok(s) => s,
        Err(message) => {
            return Ok(state
                .flash_redirect(&user.session, Flash::danger(message), "/add_student")
                .await);
        }
    };

    match StudentStore::new(state.db.pool()).insert(&new_student).await {
        Ok(student) => {
            tracing::info!(student_id = %student.id, by = %user.username, "Student added");
            Ok(state
                .flash_redirect(
                    &user.session,
                    Flash::success("Student added successfully!"),
                    "/dashboard",
                )
                .await)
        }
        Err(DbError::Conflict(_)) => Ok(state
            .flash_redirect(&user.session, Flash::danger(EMAIL_TAKEN), "/add_student")
            .await),
        Err(e) => Err(e.into()),
    }
}

/// `GET /edit_student/{id}`
pub async fn edit_student_form(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StudentId>,
) -> Result<Response, WebError> {
    let student = get_or_404(&state, id).await?;
    state
        .render(
            &user.session,
            "student_form.html",
            context! {
                title => "Edit Student",
                action => format!("/edit_student/{id}"),
                student => student,
            },
        )
        .await
}

/// `POST /edit_student/{id}`
pub async fn edit_student(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StudentId>,
    Form(form): Form<StudentForm>,
) -> Result<Response, WebError> {
    get_or_404(&state, id).await?;
    let back = format!("/edit_student/{id}");

    let changes = match form.into_student() {
        Ok(s) => s,
        Err(message) => {
            return Ok(state
                .flash_redirect(&user.session, Flash::danger(message), &back)
                .await);
        }
    };

    match StudentStore::new(state.db.pool()).update(id, &changes).await {
        Ok(true) => {
            tracing::info!(student_id = %id, by = %user.username, "Student updated");
            Ok(state
                .flash_redirect(
                    &user.session,
                    Flash::success("Student updated successfully!"),
                    "/dashboard",
                )
                .await)
        }
        // Deleted between the lookup and the update.
        Ok(false) => Err(WebError::NotFound("Student".to_owned())),
        Err(DbError::Conflict(_)) => Ok(state
            .flash_redirect(&user.session, Flash::danger(EMAIL_TAKEN), &back)
            .await),
        Err(e) => Err(e.into()),
    }
}

/// `POST /delete_student/{id}`
///
/// Enrollments go with the student.
pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StudentId>,
) -> Result<Response, WebError> {
    if !StudentStore::new(state.db.pool()).delete(id).await? {
        return Err(WebError::NotFound("Student".to_owned()));
    }
    tracing::info!(student_id = %id, by = %user.username, "Student deleted");
    Ok(state
        .flash_redirect(
            &user.session,
            Flash::success("Student deleted successfully!"),
            "/dashboard",
        )
        .await)
}

/// `GET /student/{id}`
pub async fn profile(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StudentId>,
) -> Result<Response, WebError> {
    let student = get_or_404(&state, id).await?;
    let courses = CourseStore::new(state.db.pool());
    let enrolled = courses.courses_for_student(id).await?;
    let available: Vec<_> = courses
        .list()
        .await?
        .into_iter()
        .filter(|c| !enrolled.iter().any(|e| e.id == c.id))
        .collect();

    state
        .render(
            &user.session,
            "student.html",
            context! {
                student => student,
                enrolled => enrolled,
                available => available,
            },
        )
        .await
}

/// `POST /student/{id}/enroll`
pub async fn enroll(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<StudentId>,
    Form(form): Form<EnrollForm>,
) -> Result<Response, WebError> {
    get_or_404(&state, id).await?;
    let back = format!("/student/{id}");
    let Some(course) = form.course() else {
        return Ok(state
            .flash_redirect(&user.session, Flash::danger(UNKNOWN_COURSE), &back)
            .await);
    };

    let flash = match CourseStore::new(state.db.pool()).enroll(id, course).await {
        Ok(true) => {
            tracing::info!(student_id = %id, course_id = %course, "Student enrolled");
            Flash::success("Student enrolled successfully!")
        }
        Ok(false) => Flash::info("Student is already enrolled in that course"),
        Err(DbError::MissingReference(_)) => Flash::danger(UNKNOWN_COURSE),
        Err(e) => return Err(e.into()),
    };

    Ok(state.flash_redirect(&user.session, flash, &back).await)
}

async fn get_or_404(state: &AppState, id: StudentId) -> Result<Student, WebError> {
    StudentStore::new(state.db.pool())
        .get(id)
        .await?
        .ok_or_else(|| WebError::NotFound("Student".to_owned()))
}
