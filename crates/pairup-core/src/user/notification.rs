//! Per-user notifications.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::session::Timestamped;

/// Category of a notification, used by front ends to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NotificationKind {
    #[default]
    General,
    Session,
    Warning,
}

// Unknown kinds written by other clients read as `General`.
impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}

/// A notification delivered to a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kind: NotificationKind,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
}

fn default_title() -> String {
    "Notification".to_string()
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            kind,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

impl Timestamped for Notification {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}
