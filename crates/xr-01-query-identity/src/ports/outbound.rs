//! # Outbound Ports (Driven Ports)
//!
//! Storage the dispatcher needs for at-most-once execution.

use crate::domain::QueryId;

/// Set of query identities that have already been acted on.
///
/// `try_mark` must be atomic: of two concurrent callers with the same
/// identity, exactly one observes `true`.
pub trait ReplayGuard: Send + Sync {
    /// Whether the identity has been marked.
    fn contains(&self, id: &QueryId) -> bool;

    /// Mark the identity. Returns `false` if it was already marked.
    fn try_mark(&self, id: QueryId) -> bool;

    /// Drop a mark whose execution was rolled back.
    fn release(&self, id: &QueryId);

    /// Number of marked identities.
    fn len(&self) -> usize;

    /// Whether no identity has been marked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
