//! User roles.

use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use crate::error::{PairUpError, Result};
use crate::session::Slot;

/// The role a user registers with.
///
/// Each role maps to exactly one session slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    /// Edits the shared code buffer.
    Driver,
    /// Reviews and guides without write access to the buffer.
    Navigator,
    /// Teacher; may evaluate and finalize sessions.
    #[strum(to_string = "Profesor", serialize = "Professor")]
    Profesor,
}

// Stored documents may carry any casing or the English spelling.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Role {
    /// Parses a role name coming from outside the domain (store, CLI).
    pub fn parse(value: &str) -> Result<Self> {
        Self::from_str(value.trim())
            .map_err(|_| PairUpError::validation(format!("Unknown role: '{value}'")))
    }

    /// The session slot this role occupies.
    pub const fn slot(self) -> Slot {
        match self {
            Self::Driver => Slot::Driver,
            Self::Navigator => Slot::Navigator,
            Self::Profesor => Slot::Professor,
        }
    }

    pub const fn is_teacher(self) -> bool {
        matches!(self, Self::Profesor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_accepts_known_names() {
        assert_eq!(Role::parse("Driver").unwrap(), Role::Driver);
        assert_eq!(Role::parse("navigator").unwrap(), Role::Navigator);
        assert_eq!(Role::parse("Profesor").unwrap(), Role::Profesor);
        assert_eq!(Role::parse("PROFESSOR").unwrap(), Role::Profesor);
        assert_eq!(Role::parse("  Driver ").unwrap(), Role::Driver);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = Role::parse("Observer").unwrap_err();
        assert!(matches!(err, PairUpError::Validation(_)));
        assert!(Role::parse("").is_err());
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(Role::Profesor.to_string(), "Profesor");
        assert_eq!(Role::Driver.to_string(), "Driver");
    }

    #[derive(Debug, Deserialize)]
    struct Stored {
        role: Role,
    }

    #[test]
    fn test_deserialize_is_case_insensitive() {
        for (raw, expected) in [
            ("driver", Role::Driver),
            ("NAVIGATOR", Role::Navigator),
            ("profesor", Role::Profesor),
            ("Professor", Role::Profesor),
        ] {
            let stored: Stored = toml::from_str(&format!("role = \"{raw}\"")).unwrap();
            assert_eq!(stored.role, expected, "{raw}");
        }

        let err = toml::from_str::<Stored>("role = \"observer\"").unwrap_err();
        assert!(err.to_string().contains("Unknown role"));
    }

    #[test]
    fn test_serializes_canonical_name() {
        let encoded = serde_json::to_string(&Role::Profesor).unwrap();
        assert_eq!(encoded, "\"Profesor\"");
    }

    #[test]
    fn test_every_role_has_its_own_slot() {
        let slots: Vec<Slot> = Role::iter().map(Role::slot).collect();
        assert_eq!(slots, vec![Slot::Driver, Slot::Navigator, Slot::Professor]);
    }
}
