//! # Domain Layer
//!
//! Event decoding, token balances and dispatcher configuration.

pub mod config;
pub mod decoder;
pub mod token;

pub use config::*;
pub use decoder::*;
pub use token::*;
