//! UserProfile domain model.
//!
//! Represents a registered member: display name, contact, role and the
//! pairing preferences shown in the community directory.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// User profile domain model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier
    pub uid: String,
    /// Display name
    pub name: String,
    /// Contact e-mail used at registration
    pub email: String,
    /// Role chosen at registration
    pub role: Role,
    /// Programming languages the user works with
    #[serde(default)]
    pub languages: Vec<String>,
    /// Self-declared level ("Beginner", "Intermediate", ...)
    #[serde(default)]
    pub level: String,
    /// Open to being invited into a session
    #[serde(default)]
    pub available: bool,
    /// Currently online
    #[serde(default)]
    pub active: bool,
    /// Average rating shown in the member directory
    #[serde(default)]
    pub rating: f64,
}

impl UserProfile {
    /// Creates a profile with a fresh uid and empty preferences.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            role,
            languages: Vec::new(),
            level: String::new(),
            available: false,
            active: false,
            rating: 0.0,
        }
    }

    /// Case-insensitive substring match over the name and languages.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self
                .languages
                .iter()
                .any(|lang| lang.to_lowercase().contains(&query))
    }
}
