//! # Shared Types Crate
//!
//! Types shared by every relay subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: chain primitives, the proof structure, the
//!   action set and event signatures are defined here and nowhere else.
//! - **Closed Schemas**: raw transaction bytes decode into exactly one of a
//!   fixed set of tagged transaction formats. Anything else is rejected.
//! - **Fixed Widths**: every value that is hashed into an identity has a
//!   fixed-width big-endian encoding.

pub mod entities;
pub mod errors;
pub mod events;
pub mod hashing;
pub mod receipt;

pub use entities::*;
pub use errors::*;
pub use events::*;
pub use hashing::{keccak256, keccak256_concat};
pub use receipt::*;
