//! Change events pushed by session stores.

use super::message::{ChatMessage, TeacherNote};
use super::model::Session;

/// A change to a session record or one of its logs.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The record was created or mutated; carries the new state.
    Updated(Session),
    /// A participant chat message was appended.
    ChatAppended {
        session_id: String,
        message: ChatMessage,
    },
    /// A teacher-only note was appended.
    TeacherNoteAppended {
        session_id: String,
        note: TeacherNote,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Updated(session) => &session.id,
            Self::ChatAppended { session_id, .. } | Self::TeacherNoteAppended { session_id, .. } => {
                session_id
            }
        }
    }
}
