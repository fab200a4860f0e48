//! On-disk document shapes.
//!
//! Each document bundles a record with the sub-collections stored beside it,
//! so one file lock covers the whole read-modify-write.

use pairup_core::session::{ChatMessage, Session, TeacherNote};
use pairup_core::testimonial::Testimonial;
use pairup_core::user::{Notification, UserProfile};
use serde::{Deserialize, Serialize};

/// `users/<uid>.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    pub profile: UserProfile,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl UserDocument {
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            notifications: Vec::new(),
        }
    }
}

/// `sessions/<id>.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDocument {
    pub session: Session,
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
    #[serde(default)]
    pub teacher_chat: Vec<TeacherNote>,
}

impl SessionDocument {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            chat: Vec::new(),
            teacher_chat: Vec::new(),
        }
    }
}

/// `testimonials.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestimonialsDocument {
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
}
