//! Session repository trait.
//!
//! Defines the interface for the `sessions/{id}` documents, their chat
//! sub-collections and the change feed.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::event::SessionEvent;
use super::message::{ChatMessage, TeacherNote};
use super::model::Session;
use crate::error::Result;

/// A mutation applied to a session under the store's lock.
///
/// If the closure returns an error nothing is written.
pub type SessionMutation = Box<dyn FnOnce(&mut Session) -> Result<()> + Send>;

/// What [`SessionRepository::update`] left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUpdate {
    /// The record after the mutation
    pub session: Session,
    /// False when the mutation left the record as it was; nothing was
    /// written and no event was published.
    pub changed: bool,
}

/// Which sessions to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Only sessions whose `active` flag matches
    pub active: Option<bool>,
}

impl SessionFilter {
    pub const fn active() -> Self {
        Self { active: Some(true) }
    }

    pub const fn finished() -> Self {
        Self {
            active: Some(false),
        }
    }

    pub fn matches(&self, session: &Session) -> bool {
        self.active.is_none_or(|active| session.active == active)
    }
}

/// An abstract repository for session persistence.
///
/// The store is the only authority on session state. All writes to an
/// existing record go through [`SessionRepository::update`], which must run
/// the read-modify-write atomically with respect to other writers of the
/// same record; that is what keeps two joiners from both taking one seat.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a freshly created session.
    ///
    /// Fails if a session with the same id already exists.
    async fn create(&self, session: &Session) -> Result<()>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Lists sessions matching `filter`, newest first.
    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>>;

    /// Atomically applies `mutation` to a stored session and returns the
    /// new state.
    ///
    /// Fails with `NotFound` when the session does not exist, or with
    /// whatever error the mutation returns (the record is then unchanged).
    /// Change events are published in commit order.
    async fn update(&self, session_id: &str, mutation: SessionMutation) -> Result<SessionUpdate>;

    /// Appends a message to the participant chat.
    ///
    /// The author must be seated and the session active at the moment of
    /// the write; see [`Session::ensure_can_chat`].
    async fn append_chat(&self, session_id: &str, message: &ChatMessage) -> Result<()>;

    /// Returns the participant chat in ascending timestamp order.
    async fn chat(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// Appends a note to the teacher-only chat.
    async fn append_teacher_note(&self, session_id: &str, note: &TeacherNote) -> Result<()>;

    /// Returns the teacher-only chat in ascending timestamp order.
    async fn teacher_notes(&self, session_id: &str) -> Result<Vec<TeacherNote>>;

    /// Subscribes to changes of every session in this store.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
