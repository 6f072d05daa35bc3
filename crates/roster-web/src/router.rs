//! Axum router construction for the Roster web application.
//!
//! Assembles every page route plus the static asset directory into a
//! single [`Router`]. Pages sit behind the session middleware; static
//! assets do not.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::courses;
use crate::handlers;
use crate::session::session_layer;
use crate::state::AppState;
use crate::students;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- home page
/// - `GET|POST /register`, `GET|POST /login`, `GET /logout` -- accounts
/// - `GET /dashboard` -- student list with delete buttons
/// - `GET|POST /add_student`, `GET|POST /edit_student/{id}`
/// - `POST /delete_student/{id}`
/// - `GET /student/{id}`, `POST /student/{id}/enroll` -- profile and enrollment
/// - `GET|POST /courses` -- course catalogue
/// - `/static/*` -- files from the configured static directory
///
/// Unknown paths fall through to a 404 page.
pub fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.static_dir);

    Router::new()
        // Public pages
        .route("/", get(handlers::home))
        .route(
            "/register",
            get(handlers::register_form).post(handlers::register),
        )
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        // Student management
        .route("/dashboard", get(students::dashboard))
        .route(
            "/add_student",
            get(students::add_student_form).post(students::add_student),
        )
        .route(
            "/edit_student/{id}",
            get(students::edit_student_form).post(students::edit_student),
        )
        .route("/delete_student/{id}", post(students::delete_student))
        .route("/student/{id}", get(students::profile))
        .route("/student/{id}/enroll", post(students::enroll))
        // Courses
        .route(
            "/courses",
            get(courses::list_courses).post(courses::add_course),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_layer))
        // Added after the session layer, so assets never see a session.
        .nest_service("/static", assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
