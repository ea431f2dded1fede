//! In-Memory Session Store
//!
//! Quiz sessions live only as long as the process. Each browser is identified
//! by a `finquiz_session` cookie holding a UUID; each session sits behind its
//! own mutex so one user's actions are applied one at a time. Sessions idle longer
//! than the configured TTL are evicted by a background sweep.

use axum::http::{HeaderMap, header};
use finquiz_core::QuizSession;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "finquiz_session";

pub type SharedSession = Arc<Mutex<QuizSession>>;

struct SessionEntry {
    session: SharedSession,
    last_access: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    max_attempts: u32,
}

impl SessionStore {
    /// Creates an empty store whose sessions bound generation to `max_attempts`.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
        }
    }

    /// Looks up the session named by `id`, creating a fresh one under a new id
    /// when the id is absent or unknown. Either way the session counts as
    /// accessed now.
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession) {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_access = now;
                return (id, entry.session.clone());
            }
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(QuizSession::with_max_attempts(
            self.max_attempts,
        )));
        sessions.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_access: now,
            },
        );
        debug!(session_id = %id, total = sessions.len(), "Created quiz session");
        (id, session)
    }

    /// Resolves the caller's session from the request's cookie header.
    pub async fn for_request(&self, headers: &HeaderMap) -> (Uuid, SharedSession) {
        self.get_or_create(session_id_from_headers(headers)).await
    }

    /// Drops a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.lock().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drops every session not accessed within `max_idle`. Returns how many
    /// were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        self.evict_idle_at(Instant::now(), max_idle).await
    }

    async fn evict_idle_at(&self, now: Instant, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_access) <= max_idle);
        before - sessions.len()
    }

    /// Starts a background task that evicts idle sessions every half `max_idle`.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (max_idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle(max_idle).await;
                if evicted > 0 {
                    let active = store.len().await;
                    info!(evicted, active, "Evicted idle quiz sessions");
                }
            }
        })
    }
}

/// Extracts the session id from a `Cookie` header, ignoring malformed values.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// The `Set-Cookie` value binding a browser to `id`.
pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
