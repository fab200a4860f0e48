//! Session domain model.
//!
//! This module contains the core Session entity: three role seats, the
//! shared code buffer, the active flag and the teacher's evaluation. Chat
//! logs live beside the record in the store and are not part of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evaluation::Evaluation;
use super::slot::{ClaimOutcome, SessionSlots, Slot, SlotAssigner};
use crate::error::{PairUpError, Result};
use crate::user::Role;

/// A pair-programming session.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format), generated client-side
    pub id: String,
    /// True while the session accepts participants and interaction
    pub active: bool,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When a teacher finalized the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Shared code buffer; only the driver writes it
    #[serde(default)]
    pub code: String,
    /// Seat occupants
    #[serde(default)]
    pub slots: SessionSlots,
    /// Teacher evaluation
    #[serde(default, skip_serializing_if = "Evaluation::is_empty")]
    pub evaluation: Evaluation,
}

impl Session {
    /// Creates a new active session with the creator seated in their role's slot.
    pub fn new(creator_uid: &str, creator_role: Role) -> Result<Self> {
        if creator_uid.trim().is_empty() {
            return Err(PairUpError::validation("creator id must not be empty"));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            active: true,
            created_at: Utc::now(),
            ended_at: None,
            code: String::new(),
            slots: SessionSlots::seated(creator_role.slot(), creator_uid),
            evaluation: Evaluation::default(),
        })
    }

    /// Seats `uid` in the slot for `role`.
    ///
    /// # Errors
    ///
    /// - `SessionInactive` if the session was finalized
    /// - `SlotOccupied` if another user holds the seat
    pub fn join(&mut self, role: Role, uid: &str) -> Result<ClaimOutcome> {
        self.ensure_active()?;
        SlotAssigner::assign(&mut self.slots, role, uid)
    }

    /// Replaces the shared code buffer.
    ///
    /// Only the user seated as driver may write, and only while active.
    pub fn write_code(&mut self, uid: &str, code: impl Into<String>) -> Result<()> {
        self.ensure_active()?;
        if self.slots.occupant(Slot::Driver) != Some(uid) {
            return Err(PairUpError::permission_denied(
                "only the driver may edit the shared code",
            ));
        }
        self.code = code.into();
        Ok(())
    }

    /// Marks the session inactive.
    ///
    /// Any teacher may finalize any session. Returns `false` when the
    /// session was already inactive, in which case nothing changes.
    pub fn finalize(&mut self, role: Role) -> Result<bool> {
        if !role.is_teacher() {
            return Err(PairUpError::permission_denied(
                "only a Profesor may finalize a session",
            ));
        }
        if !self.active {
            return Ok(false);
        }
        self.active = false;
        self.ended_at = Some(Utc::now());
        Ok(true)
    }

    /// Checks that `uid` may post to the participant chat.
    pub fn ensure_can_chat(&self, uid: &str) -> Result<()> {
        self.ensure_active()?;
        if !self.slots.is_seated(uid) {
            return Err(PairUpError::permission_denied(
                "only seated participants may chat",
            ));
        }
        Ok(())
    }

    pub fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(PairUpError::SessionInactive(self.id.clone()))
        }
    }

    /// Whether a user with `role` could join right now.
    pub fn is_joinable_by(&self, role: Role) -> bool {
        self.active && SlotAssigner::is_eligible(&self.slots, role)
    }

    pub fn is_participant(&self, uid: &str) -> bool {
        self.slots.is_seated(uid)
    }

    /// Whole minutes between creation and finalization; zero while active.
    pub fn duration_minutes(&self) -> i64 {
        self.ended_at
            .map(|ended| (ended - self.created_at).num_minutes().max(0))
            .unwrap_or(0)
    }
}
