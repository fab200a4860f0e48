//! Session domain module.
//!
//! This module contains all session-related domain models, the slot
//! assignment rule and the repository interface.
//!
//! # Module Structure
//!
//! - `slot`: Role seats and the assignment rule (`Slot`, `SessionSlots`, `SlotAssigner`)
//! - `model`: Core session domain model (`Session`)
//! - `message`: Chat types (`ChatMessage`, `TeacherNote`)
//! - `evaluation`: Teacher evaluation (`Evaluation`, `Grade`)
//! - `event`: Change feed events (`SessionEvent`)
//! - `repository`: Repository trait for session persistence
//!
//! # Usage
//!
//! ```ignore
//! use pairup_core::session::{Session, SessionRepository, SlotAssigner};
//! ```

mod evaluation;
mod event;
mod message;
mod model;
mod repository;
mod slot;

// Re-export public API
pub use evaluation::{Evaluation, Grade};
pub use event::SessionEvent;
pub use message::{ChatMessage, TeacherNote, Timestamped, insert_ordered};
pub use model::Session;
pub use repository::{SessionFilter, SessionMutation, SessionRepository, SessionUpdate};
pub use slot::{ClaimOutcome, SessionSlots, Slot, SlotAssigner};
