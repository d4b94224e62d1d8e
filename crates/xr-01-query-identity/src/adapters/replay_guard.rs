//! In-memory replay guard.
//!
//! Process-local only; restarting the process forgets every mark.

use crate::domain::QueryId;
use crate::ports::ReplayGuard;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::debug;

/// Mutex-protected set of processed identities.
#[derive(Debug, Default)]
pub struct InMemoryReplayGuard {
    marked: Mutex<HashSet<QueryId>>,
}

impl InMemoryReplayGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplayGuard for InMemoryReplayGuard {
    fn contains(&self, id: &QueryId) -> bool {
        self.marked.lock().contains(id)
    }

    fn try_mark(&self, id: QueryId) -> bool {
        let inserted = self.marked.lock().insert(id);
        if inserted {
            debug!(query_id = %id, "[xr-01] Identity marked");
        }
        inserted
    }

    fn release(&self, id: &QueryId) {
        if self.marked.lock().remove(id) {
            debug!(query_id = %id, "[xr-01] Identity mark released");
        }
    }

    fn len(&self) -> usize {
        self.marked.lock().len()
    }
}
