//! # Adapters Layer

pub mod clock;

pub use clock::ManualClock;
