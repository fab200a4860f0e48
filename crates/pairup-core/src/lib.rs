//! Domain layer for PairUp.
//!
//! Holds the typed models, the role/slot rules and the repository traits
//! that stand in for the external document store. Nothing in this crate
//! performs I/O.

pub mod config;
pub mod error;
pub mod progress;
pub mod session;
pub mod testimonial;
pub mod user;

// Re-export common error type
pub use error::{PairUpError, Result};
