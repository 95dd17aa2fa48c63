use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use reframe_algo::{SelectionMode, StateVector};

/// Selection waiting for its reward
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExperience {
    pub state: StateVector,
    pub action_index: usize,
    pub mode: SelectionMode,
    pub selected_at: DateTime<Utc>,
}

impl PendingExperience {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.selected_at)
            .to_std()
            .map(|age| age > ttl)
            .unwrap_or(false)
    }
}

/// Pending experiences keyed by session id.
///
/// Each session owns one slot; a new selection for the same session replaces
/// its previous pending entry and never touches other sessions.
pub struct PendingStore {
    entries: RwLock<HashMap<String, PendingExperience>>,
    ttl: Duration,
    max_entries: usize,
}

impl PendingStore {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the entry this one replaced, if any
    pub async fn insert(
        &self,
        session_id: &str,
        pending: PendingExperience,
    ) -> Option<PendingExperience> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(session_id) && entries.len() >= self.max_entries {
            Self::evict_oldest(&mut entries);
        }
        entries.insert(session_id.to_string(), pending)
    }

    /// Remove and return the live entry for `session_id`
    pub async fn take(&self, session_id: &str, now: DateTime<Utc>) -> Option<PendingExperience> {
        let mut entries = self.entries.write().await;
        let pending = entries.remove(session_id)?;
        if pending.is_expired(now, self.ttl) {
            debug!(session_id, "Pending experience expired before feedback");
            return None;
        }
        Some(pending)
    }

    /// Put an entry back unless the session already made a newer selection
    pub async fn restore(&self, session_id: &str, pending: PendingExperience) {
        let mut entries = self.entries.write().await;
        entries.entry(session_id.to_string()).or_insert(pending);
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.entries.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, pending| !pending.is_expired(now, ttl));
        before - entries.len()
    }

    fn evict_oldest(entries: &mut HashMap<String, PendingExperience>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, pending)| pending.selected_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            debug!(session_id = %key, "Evicting oldest pending experience");
            entries.remove(&key);
        }
    }
}
