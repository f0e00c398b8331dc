//! # Underwriter Core Types
//!
//! The shared vocabulary of the underwriting pipeline: raw statement
//! transactions, their classified form, and the applicant data supplied by
//! the caller. Every other crate in the workspace depends on this one; it
//! depends on nothing local.

pub mod enums;
pub mod error;
pub mod flags;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, TransactionCategory, TransactionFlag};
pub use error::CoreError;
pub use flags::FlagSet;
pub use structs::{ApplicationData, ClassifiedTransaction, Transaction};
