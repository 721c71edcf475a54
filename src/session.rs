//! Session-keyed mutable state.
//!
//! Everything the engine remembers between polls (counter baselines, the
//! previous CPU sample, the snapshot cache) lives here, keyed by session
//! id. State is created lazily on first collection, never shared across
//! sessions, and dropped as a unit on teardown.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::parsers::cpu::CpuCounters;
use crate::rate::RateComputer;

/// Mutable per-session state. The mutexes are held only for synchronous
/// parse/merge work, never across a gateway call.
///
/// Basic and detail tiers use distinct entity-key prefixes in the rate
/// table so interleaved polling of the two does not shrink each other's
/// sampling windows.
#[derive(Debug, Default)]
pub struct SessionState {
    pub rates: Mutex<RateComputer>,
    pub previous_cpu: Mutex<Option<CpuCounters>>,
    pub cache: Mutex<SnapshotCache>,
}

/// Concurrent registry of live sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the state for a session, creating it on first use.
    pub fn get_or_create(&self, session_id: &str) -> Arc<SessionState> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "creating session state");
                Arc::new(SessionState::default())
            })
            .clone()
    }

    /// Drops all state for a session. Returns false when the session was
    /// never collected from (nothing to release).
    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lazy_creation_and_reuse() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        let first = registry.get_or_create("host-a");
        let again = registry.get_or_create("host-a");
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let registry = SessionRegistry::new();
        let a = registry.get_or_create("host-a");
        let b = registry.get_or_create("host-b");
        assert!(!Arc::ptr_eq(&a, &b));

        a.rates.lock().unwrap().update("net:eth0:rx", 100, 0);
        assert!(b.rates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remove_releases_state() {
        let registry = SessionRegistry::new();
        registry.get_or_create("host-a");
        assert!(registry.remove("host-a"));
        assert!(!registry.remove("host-a"));
        assert!(registry.is_empty());
    }
}
