//! Short, user-facing notices for failed operations.
//!
//! Front ends show these transiently (a toast, a stderr line) and carry on.

use pairup_core::PairUpError;
use serde::Serialize;
use std::fmt;
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    /// The request was refused; retrying as-is will not help.
    Warning,
    /// The store failed; the same request may succeed later.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl UserNotice {
    /// Maps `err` to a notice. `action` completes "Could not ...", e.g.
    /// `"read profile"`.
    pub fn from_error(action: &str, err: &PairUpError) -> Self {
        let (level, message) = match err {
            PairUpError::NotFound { entity_type, .. } => {
                (NoticeLevel::Warning, format!("{} not found", entity_type))
            }
            PairUpError::Validation(message) => (NoticeLevel::Warning, capitalize(message)),
            PairUpError::SlotOccupied { slot } => (
                NoticeLevel::Warning,
                format!("The {} seat is already taken", slot),
            ),
            PairUpError::SessionInactive(_) => {
                (NoticeLevel::Warning, "This session has ended".to_string())
            }
            PairUpError::PermissionDenied(message) => {
                (NoticeLevel::Warning, capitalize(message))
            }
            PairUpError::DataAccess(_)
            | PairUpError::Serialization { .. }
            | PairUpError::Io { .. }
            | PairUpError::Config(_)
            | PairUpError::Internal(_) => (NoticeLevel::Error, format!("Could not {}", action)),
        };
        Self { level, message }
    }
}

impl fmt::Display for UserNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
