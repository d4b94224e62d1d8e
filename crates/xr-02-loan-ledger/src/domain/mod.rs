//! # Domain Layer
//!
//! Loan value objects, the `LoanOrder` aggregate and signing rules.

pub mod entities;
pub mod errors;
pub mod signing;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use signing::*;
pub use value_objects::*;
