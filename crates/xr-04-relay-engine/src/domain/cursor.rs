//! Per-stream scan cursor.

use super::stream::StreamKey;
use serde::{Deserialize, Serialize};
use shared_types::BlockHeight;

/// Next height to scan for one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCursor {
    /// Stream this cursor belongs to.
    pub stream: StreamKey,
    /// First height not yet scanned.
    pub next_height: BlockHeight,
}

impl PollCursor {
    /// Cursor at `next_height`.
    pub fn new(stream: StreamKey, next_height: BlockHeight) -> Self {
        Self {
            stream,
            next_height,
        }
    }

    /// Cursor after a successful scan up to and including `scanned_to`.
    pub fn after(self, scanned_to: BlockHeight) -> Self {
        Self {
            next_height: scanned_to.saturating_add(1),
            ..self
        }
    }

    /// Whether the chain has anything new for this cursor.
    pub fn has_work(&self, current_height: BlockHeight) -> bool {
        current_height >= self.next_height
    }
}
