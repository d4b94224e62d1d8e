//! # Adapters Layer

pub mod replay_guard;

pub use replay_guard::InMemoryReplayGuard;
