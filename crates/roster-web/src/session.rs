//! Server-side sessions and flash messages.
//!
//! The browser only holds a random session ID in the [`SESSION_COOKIE`]
//! cookie. The logged-in username and pending flash messages live in the
//! in-memory [`SessionStore`]. Sessions expire after a configurable idle
//! period.
//!
//! A session is only created when something is first written to it (a
//! flash message or a login), so anonymous page views and asset fetches
//! leave the store untouched. [`session_layer`] sets the cookie whenever
//! a request creates or rotates its session.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Duration, Utc};
use roster_types::Flash;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::WebError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "roster_session";

/// Flash shown when a protected page is requested without logging in.
pub const LOGIN_REQUIRED: &str = "Please login first";

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }

    fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct SessionData {
    user: Option<String>,
    flashes: Vec<Flash>,
    last_seen: DateTime<Utc>,
}

impl SessionData {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            user: None,
            flashes: Vec::new(),
            last_seen: now,
        }
    }
}

/// In-memory session table.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionData>>,
    ttl: Duration,
}

impl SessionStore {
    /// Create an empty store whose sessions expire after `ttl` idle time.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Start a new anonymous session.
    pub async fn create(&self) -> SessionId {
        let id = SessionId::random();
        self.sessions
            .write()
            .await
            .insert(id, SessionData::new(Utc::now()));
        tracing::debug!(session = %id, "Session created");
        id
    }

    /// Replace `old` with a session under a fresh ID.
    ///
    /// Pending flashes move to the new session; the login state does not.
    /// The old ID stops working.
    pub async fn rotate(&self, old: Option<SessionId>) -> SessionId {
        let id = SessionId::random();
        let mut data = SessionData::new(Utc::now());
        let mut sessions = self.sessions.write().await;
        if let Some(previous) = old.and_then(|old| sessions.remove(&old)) {
            data.flashes = previous.flashes;
        }
        sessions.insert(id, data);
        tracing::debug!(session = %id, "Session rotated");
        id
    }

    /// Mark `id` as used now.
    ///
    /// Returns `false` (and forgets the session) if it is unknown or has
    /// been idle longer than the TTL.
    pub async fn touch(&self, id: SessionId) -> bool {
        self.touch_at(id, Utc::now()).await
    }

    async fn touch_at(&self, id: SessionId, now: DateTime<Utc>) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(data) = sessions.get_mut(&id) else {
            return false;
        };
        if now.signed_duration_since(data.last_seen) > self.ttl {
            sessions.remove(&id);
            tracing::debug!(session = %id, "Session expired");
            return false;
        }
        data.last_seen = now;
        true
    }

    /// The username logged in on `id`, if any.
    pub async fn user(&self, id: SessionId) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(&id)
            .and_then(|data| data.user.clone())
    }

    /// Log `username` in on `id`, or log out with `None`.
    pub async fn set_user(&self, id: SessionId, username: Option<String>) {
        if let Some(data) = self.sessions.write().await.get_mut(&id) {
            data.user = username;
        }
    }

    /// Queue a flash message for the next rendered page.
    pub async fn push_flash(&self, id: SessionId, flash: Flash) {
        if let Some(data) = self.sessions.write().await.get_mut(&id) {
            data.flashes.push(flash);
        }
    }

    /// Remove and return all queued flash messages.
    pub async fn take_flashes(&self, id: SessionId) -> Vec<Flash> {
        self.sessions
            .write()
            .await
            .get_mut(&id)
            .map(|data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, data| now.signed_duration_since(data.last_seen) <= self.ttl);
        before.saturating_sub(sessions.len())
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions exist.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Find the session ID in the request's `Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value.trim()))
}

/// The session attached to one request.
///
/// Starts out as whatever valid session the cookie named, possibly none.
/// Cloning shares the same slot, so [`session_layer`] sees IDs created
/// or rotated by the handler.
#[derive(Debug, Clone)]
pub struct Session {
    slot: Arc<Mutex<SessionSlot>>,
}

#[derive(Debug)]
struct SessionSlot {
    id: Option<SessionId>,
    /// Set when this request created or rotated the ID.
    issued: bool,
}

impl Session {
    fn resume(id: Option<SessionId>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SessionSlot { id, issued: false })),
        }
    }

    /// The current session ID, if a session exists.
    pub async fn id(&self) -> Option<SessionId> {
        self.slot.lock().await.id
    }

    /// The current session ID, creating the session in `store` if there
    /// is none yet.
    pub async fn get_or_create(&self, store: &SessionStore) -> SessionId {
        let mut slot = self.slot.lock().await;
        if let Some(id) = slot.id {
            return id;
        }
        let id = store.create().await;
        slot.id = Some(id);
        slot.issued = true;
        id
    }

    /// Move to a fresh session ID (see [`SessionStore::rotate`]).
    pub async fn rotate(&self, store: &SessionStore) -> SessionId {
        let mut slot = self.slot.lock().await;
        let id = store.rotate(slot.id).await;
        slot.id = Some(id);
        slot.issued = true;
        id
    }

    /// The ID the client must be told about, if this request issued one.
    async fn issued(&self) -> Option<SessionId> {
        let slot = self.slot.lock().await;
        slot.id.filter(|_| slot.issued)
    }
}

/// Middleware attaching a [`Session`] to every request it wraps.
///
/// Reuses the cookie's session when it is still valid. Sets the cookie
/// on the response when the handler created or rotated the session.
pub async fn session_layer(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = match session_cookie(request.headers()) {
        Some(id) if state.sessions.touch(id).await => Some(id),
        _ => None,
    };
    let session = Session::resume(existing);

    request.extensions_mut().insert(session.clone());
    let mut response = next.run(request).await;

    if let Some(id) = session.issued().await {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Could not encode session cookie"),
        }
    }

    response
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            WebError::Internal("session layer is not installed".to_owned()).into_response()
        })
    }
}

/// The logged-in user of the current request.
///
/// Extracting it on a request without a logged-in session queues the
/// [`LOGIN_REQUIRED`] flash and rejects with a redirect to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Logged-in username.
    pub username: String,
    /// The request's session.
    pub session: Session,
}

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let user = match session.id().await {
            Some(id) => state.sessions.user(id).await,
            None => None,
        };
        if let Some(username) = user {
            return Ok(Self { username, session });
        }

        tracing::debug!(path = %parts.uri.path(), "Login required");
        let id = session.get_or_create(&state.sessions).await;
        state
            .sessions
            .push_flash(id, Flash::danger(LOGIN_REQUIRED))
            .await;
        Err(Redirect::to("/login").into_response())
    }
}
