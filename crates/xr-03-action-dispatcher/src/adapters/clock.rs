//! Externally driven execution clock.

use crate::ports::ExecutionClock;
use shared_types::BlockHeight;
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock whose height is set by its owner.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// Clock starting at `height`.
    pub fn new(height: BlockHeight) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Jump to `height`.
    pub fn set(&self, height: BlockHeight) {
        self.height.store(height, Ordering::SeqCst);
    }

    /// Move forward by `blocks`.
    pub fn advance(&self, blocks: u64) -> BlockHeight {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }
}

impl ExecutionClock for ManualClock {
    fn current_height(&self) -> BlockHeight {
        self.height.load(Ordering::SeqCst)
    }
}
