//! Course catalogue handlers.

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::response::Response;
use minijinja::context;
use roster_db::CourseStore;
use roster_types::Flash;

use crate::error::WebError;
use crate::forms::CourseForm;
use crate::session::CurrentUser;
use crate::state::AppState;

/// `GET /courses`
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Response, WebError> {
    let courses = CourseStore::new(state.db.pool()).list().await?;
    state
        .render(&user.session, "courses.html", context! { courses => courses })
        .await
}

/// `POST /courses`
pub async fn add_course(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Form(form): Form<CourseForm>,
) -> Result<Response, WebError> {
    let flash = match form.into_course() {
        Ok(new_course) => {
            let course = CourseStore::new(state.db.pool()).insert(&new_course).await?;
            tracing::info!(course_id = %course.id, by = %user.username, "Course added");
            Flash::success("Course added successfully!")
        }
        Err(message) => Flash::danger(message),
    };
    Ok(state.flash_redirect(&user.session, flash, "/courses").await)
}
