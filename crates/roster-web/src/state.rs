//! Shared application state.
//!
//! [`AppState`] is wrapped in [`Arc`](std::sync::Arc) and injected via
//! Axum's `State` extractor. It owns the database pool, the loaded
//! templates, the session table, and the password hasher.

use std::path::PathBuf;

use axum::response::{Html, IntoResponse, Redirect, Response};
use minijinja::context;
use roster_db::Database;
use roster_types::Flash;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::WebError;
use crate::password::PasswordService;
use crate::session::{Session, SessionStore};
use crate::templates::Templates;

/// Shared state for the Axum application.
pub struct AppState {
    /// Database connection pool.
    pub db: Database,
    /// Loaded page templates.
    pub templates: Templates,
    /// Server-side sessions.
    pub sessions: SessionStore,
    /// Password hasher.
    pub passwords: PasswordService,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Assemble state from an open database and the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Template`] if templates fail to load, or
    /// [`WebError::Password`] if the hashing parameters are invalid.
    pub fn new(db: Database, config: &AppConfig) -> Result<Self, WebError> {
        let templates = Templates::from_dir(&config.assets.templates_dir)?;
        let passwords = PasswordService::new(&config.password)?;
        let ttl = chrono::Duration::minutes(i64::from(config.session.ttl_minutes));
        Ok(Self {
            db,
            templates,
            sessions: SessionStore::new(ttl),
            passwords,
            static_dir: config.assets.static_dir.clone(),
        })
    }

    /// Render a page for `session`.
    ///
    /// Adds the session's pending flash messages (draining them) and the
    /// logged-in username to `context`. Never creates a session.
    pub async fn render<S: Serialize>(
        &self,
        session: &Session,
        template: &str,
        context: S,
    ) -> Result<Response, WebError> {
        let (flashes, user) = match session.id().await {
            Some(id) => (
                self.sessions.take_flashes(id).await,
                self.sessions.user(id).await,
            ),
            None => (Vec::new(), None),
        };
        let page = minijinja::Value::from_serialize(&context);
        let html = self.templates.render(
            template,
            context! {
                flashes => flashes,
                user => user,
                ..page
            },
        )?;
        Ok(Html(html).into_response())
    }

    /// Queue `flash` and redirect to `to`.
    ///
    /// Creates the session if the request has none.
    pub async fn flash_redirect(&self, session: &Session, flash: Flash, to: &str) -> Response {
        let id = session.get_or_create(&self.sessions).await;
        self.sessions.push_flash(id, flash).await;
        Redirect::to(to).into_response()
    }
}
