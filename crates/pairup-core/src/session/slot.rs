//! Role slots and the rule that fills them.
//!
//! A session has three seats, one per role. A seat is vacant when it holds
//! no identity or an empty string, and once taken it is never handed to a
//! different user.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::{PairUpError, Result};
use crate::user::Role;

/// One of the three named seats on a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Slot {
    Driver,
    Navigator,
    Professor,
}

/// The occupants of a session's seats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
}

impl SessionSlots {
    /// Slots with only the given seat taken.
    pub fn seated(slot: Slot, uid: impl Into<String>) -> Self {
        let mut slots = Self::default();
        *slots.field_mut(slot) = Some(uid.into());
        slots
    }

    /// The identity occupying `slot`, if any. Empty strings count as vacant.
    pub fn occupant(&self, slot: Slot) -> Option<&str> {
        self.field(slot).as_deref().filter(|uid| !uid.is_empty())
    }

    pub fn is_vacant(&self, slot: Slot) -> bool {
        self.occupant(slot).is_none()
    }

    /// The seat held by `uid`, if the user is seated at all.
    pub fn seat_of(&self, uid: &str) -> Option<Slot> {
        Slot::iter().find(|slot| self.occupant(*slot) == Some(uid))
    }

    pub fn is_seated(&self, uid: &str) -> bool {
        self.seat_of(uid).is_some()
    }

    fn field(&self, slot: Slot) -> &Option<String> {
        match slot {
            Slot::Driver => &self.driver,
            Slot::Navigator => &self.navigator,
            Slot::Professor => &self.professor,
        }
    }

    fn field_mut(&mut self, slot: Slot) -> &mut Option<String> {
        match slot {
            Slot::Driver => &mut self.driver,
            Slot::Navigator => &mut self.navigator,
            Slot::Professor => &mut self.professor,
        }
    }
}

/// What a successful claim did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// The seat was vacant and now holds the caller.
    Seated,
    /// The caller already held the seat; nothing was written.
    AlreadySeated,
}

/// Enforces the role-to-slot matching rule.
///
/// The assigner only mutates the slots it is handed; atomicity against
/// other writers is the job of whichever store runs it.
pub struct SlotAssigner;

impl SlotAssigner {
    /// Whether a user with `role` could take a seat in these slots.
    pub fn is_eligible(slots: &SessionSlots, role: Role) -> bool {
        slots.is_vacant(role.slot())
    }

    /// Seats `uid` in the slot matching `role`.
    ///
    /// # Errors
    ///
    /// `SlotOccupied` when another user holds the seat. The slots are left
    /// untouched in that case.
    pub fn assign(slots: &mut SessionSlots, role: Role, uid: &str) -> Result<ClaimOutcome> {
        if uid.trim().is_empty() {
            return Err(PairUpError::validation("user id must not be empty"));
        }

        let slot = role.slot();
        match slots.occupant(slot) {
            None => {
                *slots.field_mut(slot) = Some(uid.to_string());
                Ok(ClaimOutcome::Seated)
            }
            Some(current) if current == uid => Ok(ClaimOutcome::AlreadySeated),
            Some(current) => {
                tracing::debug!("{} slot already held by {}", slot, current);
                Err(PairUpError::SlotOccupied { slot })
            }
        }
    }
}
