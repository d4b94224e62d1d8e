//! # Domain Layer
//!
//! Streams, cursors, the processed-transaction cache, gas budgeting and
//! job bookkeeping.

pub mod cursor;
pub mod errors;
pub mod gas;
pub mod job;
pub mod stream;
pub mod tx_cache;

pub use cursor::PollCursor;
pub use errors::*;
pub use gas::*;
pub use job::*;
pub use stream::*;
pub use tx_cache::ProcessedTxCache;
