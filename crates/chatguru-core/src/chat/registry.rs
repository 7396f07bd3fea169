//! Registry of live sessions for multi-user hosts.
//!
//! Each session sits behind its own async mutex. A host holds that lock for
//! the full handling of one event (including the inference call), so events
//! on the same session run one at a time while other sessions proceed.
//!
//! Sessions end on an explicit `remove` or when they sit idle longer than
//! the sweeper's limit.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use chatguru_types::error::ChatError;
use chatguru_types::persona::Persona;

use super::session::SessionStore;

/// A session handle shared between the registry and in-flight requests.
pub type SharedSession = Arc<Mutex<SessionStore>>;

struct Entry {
    session: SharedSession,
    last_active: Instant,
}

/// Concurrent map of session id to session.
///
/// Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session, optionally starting with a persona other than General.
    pub fn create(&self, persona: Option<Persona>) -> (Uuid, SharedSession) {
        let mut store = SessionStore::new();
        if let Some(persona) = persona {
            store.apply_persona(persona);
        }
        let id = store.id();
        let shared = Arc::new(Mutex::new(store));
        self.sessions.insert(
            id,
            Entry {
                session: shared.clone(),
                last_active: Instant::now(),
            },
        );
        tracing::debug!(session_id = %id, "Session created");
        (id, shared)
    }

    /// Look a session up and mark it active.
    pub fn get(&self, id: &Uuid) -> Result<SharedSession, ChatError> {
        self.sessions
            .get_mut(id)
            .map(|mut entry| {
                entry.last_active = Instant::now();
                entry.session.clone()
            })
            .ok_or(ChatError::SessionNotFound(*id))
    }

    /// Tear a session down. Requests already holding the handle finish normally.
    pub fn remove(&self, id: &Uuid) -> Result<(), ChatError> {
        self.sessions
            .remove(id)
            .map(|_| tracing::debug!(session_id = %id, "Session removed"))
            .ok_or(ChatError::SessionNotFound(*id))
    }

    /// Drop sessions untouched for longer than `max_idle`.
    ///
    /// A session whose handle is still held by a request is kept, however
    /// long that request takes. Returns the number of sessions dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|id, entry| {
            let keep =
                entry.last_active.elapsed() <= max_idle || Arc::strong_count(&entry.session) > 1;
            if !keep {
                tracing::debug!(session_id = %id, "Session expired");
            }
            keep
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Run `evict_idle` on a fixed period until the runtime shuts down.
    pub fn spawn_idle_sweeper(&self, max_idle: Duration, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::info!(evicted, remaining = registry.len(), "Expired idle sessions");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
