//! Integration tests for the Roster pages.
//!
//! Tests drive the Axum `Router` directly via `tower::ServiceExt`
//! against an in-memory `SQLite` database, carrying the session cookie
//! between requests the way a browser would.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use roster_db::{Database, StudentStore};
use roster_types::StudentId;
use roster_web::config::{AppConfig, PasswordSection};
use roster_web::router::build_router;
use roster_web::state::AppState;
use tower::ServiceExt;

/// A browser-like client: one router, one cookie jar with one cookie.
struct Client {
    router: Router,
    state: Arc<AppState>,
    cookie: Option<String>,
}

impl Client {
    async fn new() -> Self {
        let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let mut config = AppConfig::default();
        config.assets.templates_dir = crate_dir.join("templates");
        config.assets.static_dir = crate_dir.join("static");
        config.password = PasswordSection {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        };

        let db = Database::in_memory().await.unwrap();
        let state = Arc::new(AppState::new(db, &config).unwrap());
        Self {
            router: build_router(Arc::clone(&state)),
            state,
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(value) = response.headers().get(SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap().trim().to_owned();
            self.cookie = Some(pair);
        }
        response
    }

    async fn get(&mut self, path: &str) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post(&mut self, path: &str, form: &str) -> Response<Body> {
        let mut builder =
            Request::post(path).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_owned())).unwrap())
            .await
    }

    /// GET `path` and return the page body.
    async fn page(&mut self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        body_text(response).await
    }

    async fn logged_in() -> Self {
        let mut client = Self::new().await;
        let response = client.post("/register", "username=admin&password=secret").await;
        assert_eq!(location(&response), "/login");
        let response = client.post("/login", "username=admin&password=secret").await;
        assert_eq!(location(&response), "/dashboard");
        // Drain the login flash.
        client.page("/dashboard").await;
        client
    }
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned()
}

const ADA: &str = "name=Ada+Lovelace&age=17&grade=10A&email=ada%40example.com&phone=&address=";

// =========================================================================
// Public pages and accounts
// =========================================================================

#[tokio::test]
async fn anonymous_pages_create_no_session() {
    let mut client = Client::new().await;
    for path in ["/", "/login", "/register", "/nope"] {
        let response = client.get(path).await;
        assert!(response.headers().get(SET_COOKIE).is_none(), "GET {path}");
    }
    assert!(client.state.sessions.is_empty().await);
}

#[tokio::test]
async fn cookieless_asset_fetches_create_no_sessions() {
    let mut client = Client::new().await;
    for _ in 0..20 {
        let response = client.get("/static/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
    assert_eq!(client.state.sessions.len().await, 0);
}

#[tokio::test]
async fn first_flash_sets_session_cookie() {
    let mut client = Client::new().await;
    let response = client.get("/dashboard").await;
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("roster_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert_eq!(client.state.sessions.len().await, 1);

    // A known cookie is reused, not replaced.
    let response = client.get("/login").await;
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(client.state.sessions.len().await, 1);
}

#[tokio::test]
async fn login_issues_a_fresh_session_cookie() {
    let mut client = Client::new().await;
    client.post("/register", "username=admin&password=secret").await;
    let before = client.cookie.clone().unwrap();

    let response = client.post("/login", "username=admin&password=secret").await;
    assert_eq!(location(&response), "/dashboard");
    let after = client.cookie.clone().unwrap();
    assert!(after.starts_with("roster_session="));
    assert_ne!(before, after);

    // The pre-login cookie does not carry the login.
    client.cookie = Some(before);
    assert_eq!(location(&client.get("/dashboard").await), "/login");

    // The new one does, and the login flash moved with it.
    client.cookie = Some(after);
    assert!(client.page("/dashboard").await.contains("Login successful!"));
    assert_eq!(client.state.sessions.len().await, 2);
}

#[tokio::test]
async fn register_login_logout_flow() {
    let mut client = Client::new().await;

    let response = client.post("/register", "username=admin&password=secret").await;
    assert_eq!(location(&response), "/login");
    assert!(client.page("/login").await.contains("Registration successful! Please login."));

    let response = client.post("/login", "username=admin&password=secret").await;
    assert_eq!(location(&response), "/dashboard");
    let dashboard = client.page("/dashboard").await;
    assert!(dashboard.contains("Login successful!"));
    assert!(dashboard.contains("admin"));

    let response = client.get("/logout").await;
    assert_eq!(location(&response), "/");
    assert!(client.page("/").await.contains("Logged out successfully!"));

    let response = client.get("/dashboard").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let mut client = Client::new().await;
    client.post("/register", "username=admin&password=one").await;
    client.page("/login").await;

    let response = client.post("/register", "username=admin&password=two").await;
    assert_eq!(location(&response), "/register");
    assert!(client.page("/register").await.contains("Username already exists!"));
}

#[tokio::test]
async fn empty_credentials_fail_validation() {
    let mut client = Client::new().await;
    let response = client.post("/register", "username=&password=").await;
    assert_eq!(location(&response), "/register");
    assert!(client.page("/register").await.contains("flash-danger"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let mut client = Client::new().await;
    client.post("/register", "username=admin&password=secret").await;

    let response = client.post("/login", "username=admin&password=nope").await;
    assert_eq!(location(&response), "/login");
    assert!(client.page("/login").await.contains("Invalid username or password"));
    assert_eq!(client.get("/dashboard").await.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn protected_pages_require_login() {
    let mut client = Client::new().await;
    for path in ["/dashboard", "/add_student", "/courses", "/student/1", "/edit_student/1"] {
        let response = client.get(path).await;
        assert_eq!(location(&response), "/login", "GET {path}");
    }
    let response = client.post("/delete_student/1", "").await;
    assert_eq!(location(&response), "/login");
    assert!(client.page("/login").await.contains("Please login first"));
}

#[tokio::test]
async fn unknown_path_is_404() {
    let mut client = Client::new().await;
    assert_eq!(client.get("/nope").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_assets_are_served() {
    let mut client = Client::new().await;
    let response = client.get("/static/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(".flash-danger"));
}

// =========================================================================
// Students
// =========================================================================

#[tokio::test]
async fn dashboard_renders_delete_buttons_for_the_binder() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    client
        .post("/add_student", "name=Alan+Turing&age=16&grade=9B")
        .await;

    let html = client.page("/dashboard").await;
    assert_eq!(html.matches("delete-btn").count(), 2);
    assert!(html.contains(r#"action="/delete_student/1""#));
    assert!(html.contains(r#"action="/delete_student/2""#));
    assert!(html.contains(r#"method="post""#));
    assert!(html.contains("/static/pkg/roster_confirm.js"));
    assert!(html.contains("initialize()"));
}

#[tokio::test]
async fn add_student_then_view_profile() {
    let mut client = Client::logged_in().await;
    let response = client.post("/add_student", ADA).await;
    assert_eq!(location(&response), "/dashboard");

    let html = client.page("/dashboard").await;
    assert!(html.contains("Student added successfully!"));
    assert!(html.contains("Ada Lovelace"));

    let profile = client.page("/student/1").await;
    assert!(profile.contains("ada@example.com"));
    assert!(profile.contains("Not enrolled in any course."));
}

#[tokio::test]
async fn invalid_student_form_flashes_and_returns() {
    let mut client = Client::logged_in().await;
    let response = client
        .post("/add_student", "name=Ada&age=old&grade=10A")
        .await;
    assert_eq!(location(&response), "/add_student");
    assert!(client.page("/add_student").await.contains("Age must be a whole number"));

    let response = client
        .post("/add_student", "name=Ada&age=17&grade=10A&email=not-an-email")
        .await;
    assert_eq!(location(&response), "/add_student");
    assert!(client.page("/add_student").await.contains("Email address is not valid"));

    let students = StudentStore::new(client.state.db.pool()).list().await.unwrap();
    assert!(students.is_empty());
}

#[tokio::test]
async fn edit_student_updates_the_record() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;

    let form = client.page("/edit_student/1").await;
    assert!(form.contains(r#"value="Ada Lovelace""#));

    let response = client
        .post("/edit_student/1", "name=Ada+King&age=18&grade=11A&email=ada%40example.com")
        .await;
    assert_eq!(location(&response), "/dashboard");
    assert!(client.page("/dashboard").await.contains("Student updated successfully!"));

    let student = StudentStore::new(client.state.db.pool())
        .get(StudentId(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.name, "Ada King");
    assert_eq!(student.age, 18);
}

#[tokio::test]
async fn edit_with_taken_email_is_rejected() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    client
        .post("/add_student", "name=Alan&age=16&grade=9B&email=alan%40example.com")
        .await;

    let response = client
        .post("/edit_student/2", "name=Alan&age=16&grade=9B&email=ada%40example.com")
        .await;
    assert_eq!(location(&response), "/edit_student/2");
    assert!(client.page("/edit_student/2").await.contains("Email already in use"));
}

#[tokio::test]
async fn unknown_student_is_404() {
    let mut client = Client::logged_in().await;
    assert_eq!(client.get("/edit_student/42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(client.get("/student/42").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        client.post("/edit_student/42", ADA).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.post("/delete_student/42", "").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn delete_student_removes_the_row() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    client.page("/dashboard").await;

    let response = client.post("/delete_student/1", "").await;
    assert_eq!(location(&response), "/dashboard");

    let html = client.page("/dashboard").await;
    assert!(html.contains("Student deleted successfully!"));
    assert!(!html.contains("Ada Lovelace"));
    assert!(html.contains("No students yet."));
}

#[tokio::test]
async fn delete_is_not_reachable_by_get() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    let response = client.get("/delete_student/1").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let students = StudentStore::new(client.state.db.pool()).list().await.unwrap();
    assert_eq!(students.len(), 1);
}

// =========================================================================
// Courses and enrollment
// =========================================================================

#[tokio::test]
async fn add_course_and_list() {
    let mut client = Client::logged_in().await;
    let response = client
        .post("/courses", "course_name=Mathematics&description=Algebra+and+more")
        .await;
    assert_eq!(location(&response), "/courses");

    let html = client.page("/courses").await;
    assert!(html.contains("Course added successfully!"));
    assert!(html.contains("Mathematics"));
    assert!(html.contains("Algebra and more"));

    let response = client.post("/courses", "course_name=&description=").await;
    assert_eq!(location(&response), "/courses");
    assert!(client.page("/courses").await.contains("flash-danger"));
}

#[tokio::test]
async fn enroll_student_in_course() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    client.post("/courses", "course_name=Physics").await;
    client.page("/courses").await;

    let profile = client.page("/student/1").await;
    assert!(profile.contains(r#"<option value="1">Physics</option>"#));

    let response = client.post("/student/1/enroll", "course_id=1").await;
    assert_eq!(location(&response), "/student/1");
    let profile = client.page("/student/1").await;
    assert!(profile.contains("Student enrolled successfully!"));
    assert!(profile.contains("<li>Physics</li>"));
    // Enrolled courses are no longer offered.
    assert!(!profile.contains(r#"<option value="1">"#));

    client.post("/student/1/enroll", "course_id=1").await;
    assert!(
        client
            .page("/student/1")
            .await
            .contains("Student is already enrolled in that course")
    );

    client.post("/student/1/enroll", "course_id=99").await;
    assert!(client.page("/student/1").await.contains("Unknown course"));
}

#[tokio::test]
async fn malformed_course_id_flashes_unknown_course() {
    let mut client = Client::logged_in().await;
    client.post("/add_student", ADA).await;
    client.page("/dashboard").await;

    for body in ["course_id=abc", ""] {
        let response = client.post("/student/1/enroll", body).await;
        assert_eq!(location(&response), "/student/1", "body {body:?}");
        assert!(client.page("/student/1").await.contains("Unknown course"));
    }
}
