//! Chat message types.
//!
//! Both the participant chat and the private teacher log are append-only
//! and read back in ascending timestamp order.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Something that carries a client-assigned timestamp (ms since epoch).
pub trait Timestamped {
    fn timestamp(&self) -> i64;
}

/// A message in a session's participant chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    /// Author identity
    pub uid: String,
    pub text: String,
    /// Milliseconds since the Unix epoch, assigned by the sender
    pub timestamp: i64,
}

impl ChatMessage {
    pub fn new(uid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            uid: uid.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

impl Timestamped for ChatMessage {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// An entry in the teacher-only chat attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherNote {
    pub id: String,
    pub teacher_id: String,
    pub text: String,
    pub timestamp: i64,
}

impl TeacherNote {
    pub fn new(teacher_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            teacher_id: teacher_id.into(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

impl Timestamped for TeacherNote {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Inserts `item` keeping `log` sorted by timestamp.
///
/// Entries with equal timestamps stay in append order.
pub fn insert_ordered<T: Timestamped>(log: &mut Vec<T>, item: T) {
    let ts = item.timestamp();
    let at = log.partition_point(|existing| existing.timestamp() <= ts);
    log.insert(at, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, ts: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            uid: "u".to_string(),
            text: id.to_string(),
            timestamp: ts,
        }
    }

    #[test]
    fn test_insert_ordered_sorts_by_timestamp() {
        let mut log = Vec::new();
        insert_ordered(&mut log, msg("b", 20));
        insert_ordered(&mut log, msg("a", 10));
        insert_ordered(&mut log, msg("c", 30));

        let ids: Vec<&str> = log.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_ordered_keeps_append_order_on_ties() {
        let mut log = Vec::new();
        insert_ordered(&mut log, msg("first", 10));
        insert_ordered(&mut log, msg("second", 10));
        insert_ordered(&mut log, msg("early", 5));

        let ids: Vec<&str> = log.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_new_message_has_unique_id() {
        let a = ChatMessage::new("u1", "hi");
        let b = ChatMessage::new("u1", "hi");
        assert_ne!(a.id, b.id);
        assert!(a.timestamp > 0);
    }
}
