//! User domain module.
//!
//! # Module Structure
//!
//! - `role`: Registration roles (`Role`)
//! - `model`: User profile domain model
//! - `notification`: Per-user notifications
//! - `repository`: Repository trait for user persistence

mod model;
mod notification;
mod repository;
mod role;

// Re-export public API
pub use model::UserProfile;
pub use notification::{Notification, NotificationKind};
pub use repository::UserRepository;
pub use role::Role;
