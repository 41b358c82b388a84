//! Process-wide registry of live negotiation sessions
//!
//! Used for diagnostics only; nothing in a session's negotiation depends on it.

use crate::domain::roap::RoapState;
use crate::domain::shared::value_objects::SessionId;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::sync::watch;
use tracing::debug;

static GLOBAL_REGISTRY: Lazy<SessionRegistry> = Lazy::new(SessionRegistry::new);

/// Observable state of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiationStatus {
    pub state: RoapState,
    pub seq: u32,
}

/// Registry entry
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub id: SessionId,
    pub label: String,
    pub created_at: DateTime<Utc>,
    status: watch::Receiver<NegotiationStatus>,
}

impl SessionEntry {
    pub fn new(id: SessionId, label: String, status: watch::Receiver<NegotiationStatus>) -> Self {
        Self {
            id,
            label,
            created_at: Utc::now(),
            status,
        }
    }

    /// Current state and sequence number
    pub fn status(&self) -> NegotiationStatus {
        *self.status.borrow()
    }
}

/// Concurrent map of sessions keyed by id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry every [`Roap`](crate::application::Roap) registers with
    pub fn global() -> &'static SessionRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn register(&self, entry: SessionEntry) {
        debug!("Registering negotiation session {} ({})", entry.id, entry.label);
        self.sessions.insert(entry.id, entry);
    }

    pub fn unregister(&self, id: &SessionId) -> Option<SessionEntry> {
        debug!("Unregistering negotiation session {}", id);
        self.sessions.remove(id).map(|(_, entry)| entry)
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionEntry> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Rename a session; returns false when it is not registered
    pub fn set_label(&self, id: &SessionId, label: impl Into<String>) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut entry) => {
                entry.label = label.into();
                true
            }
            None => false,
        }
    }

    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
