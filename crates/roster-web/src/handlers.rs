//! Home page and account handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Home page |
//! | `GET` | `/register` | Registration form |
//! | `POST` | `/register` | Create an account |
//! | `GET` | `/login` | Login form |
//! | `POST` | `/login` | Log in |
//! | `GET` | `/logout` | Log out |

use std::sync::Arc;

use axum::Form;
use axum::extract::State;
use axum::response::Response;
use minijinja::context;
use roster_db::{DbError, UserStore};
use roster_types::{Credentials, Flash};

use crate::error::WebError;
use crate::forms::check_credentials;
use crate::session::Session;
use crate::state::AppState;

const USERNAME_TAKEN: &str = "Username already exists!";
const INVALID_LOGIN: &str = "Invalid username or password";

/// `GET /`
pub async fn home(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    state.render(&session, "home.html", context! {}).await
}

/// `GET /register`
pub async fn register_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    state.render(&session, "register.html", context! {}).await
}

/// `POST /register`
///
/// Rejects a taken username; otherwise stores the account with a hashed
/// password and sends the user to the login page.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Response, WebError> {
    let credentials = match check_credentials(credentials) {
        Ok(c) => c,
        Err(message) => {
            return Ok(state
                .flash_redirect(&session, Flash::danger(message), "/register")
                .await);
        }
    };

    let users = UserStore::new(state.db.pool());
    if users.find_by_username(&credentials.username).await?.is_some() {
        return Ok(state
            .flash_redirect(&session, Flash::danger(USERNAME_TAKEN), "/register")
            .await);
    }

    let hash = state.passwords.hash(&credentials.password)?;
    match users.create(&credentials.username, &hash).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "Account registered");
            Ok(state
                .flash_redirect(
                    &session,
                    Flash::success("Registration successful! Please login."),
                    "/login",
                )
                .await)
        }
        // Lost a race with a concurrent registration of the same name.
        Err(DbError::Conflict(_)) => Ok(state
            .flash_redirect(&session, Flash::danger(USERNAME_TAKEN), "/register")
            .await),
        Err(e) => Err(e.into()),
    }
}

/// `GET /login`
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, WebError> {
    state.render(&session, "login.html", context! {}).await
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Response, WebError> {
    let username = credentials.username.trim();
    let user = UserStore::new(state.db.pool())
        .find_by_username(username)
        .await?;

    match user {
        Some(user) if state.passwords.verify(&credentials.password, &user.password_hash) => {
            // A cookie known before login must not carry the
            // authenticated session.
            let id = session.rotate(&state.sessions).await;
            state
                .sessions
                .set_user(id, Some(user.username.clone()))
                .await;
            tracing::info!(username = %user.username, "Logged in");
            Ok(state
                .flash_redirect(&session, Flash::success("Login successful!"), "/dashboard")
                .await)
        }
        _ => {
            tracing::info!(username, "Rejected login");
            Ok(state
                .flash_redirect(&session, Flash::danger(INVALID_LOGIN), "/login")
                .await)
        }
    }
}

/// `GET /logout`
pub async fn logout(State(state): State<Arc<AppState>>, session: Session) -> Response {
    if let Some(id) = session.id().await {
        state.sessions.set_user(id, None).await;
    }
    state
        .flash_redirect(&session, Flash::success("Logged out successfully!"), "/")
        .await
}

/// Fallback for unknown paths.
pub async fn not_found() -> WebError {
    WebError::NotFound("Page".to_owned())
}

