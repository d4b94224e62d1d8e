//! # Relay Container
//!
//! Holds the devnet chains, the dispatcher and the relay engine, wired
//! through the engine's outbound ports.
//!
//! ```text
//! source chain ──scan──→ RelayEngine ──proof──→ DevnetOracle (attested blocks)
//!                            │
//!                            └──submit──→ DispatcherSubmitter ──→ ActionDispatcher
//!                                                   │                  │
//!                                                   │          ContinuityVerifier
//!                                                   ↓
//!                                  execution chain ──scan──→ completion streams
//! ```

pub mod config;
pub mod relay;

pub use config::{ConfigError, RuntimeConfig};
pub use relay::{DevnetDispatcher, RelayContainer};
