//! Error types for the PairUp application.

use thiserror::Error;

use crate::session::Slot;

/// A shared error type for the entire PairUp application.
///
/// Variants fall into two families: backend failures (the document store
/// could not be read or written) and local validation failures (the request
/// itself was rejected before or by a conditional write).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PairUpError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A required field is empty or a value is out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// The role slot targeted by a join is already taken
    #[error("Slot '{slot}' is already occupied")]
    SlotOccupied { slot: Slot },

    /// The session was finalized and no longer accepts interaction
    #[error("Session '{0}' is no longer active")]
    SessionInactive(String),

    /// The acting user's role or seat does not allow the operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PairUpError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a PermissionDenied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a SlotOccupied error
    pub fn is_slot_occupied(&self) -> bool {
        matches!(self, Self::SlotOccupied { .. })
    }

    /// True when the store itself failed (network, disk, corrupt data).
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::DataAccess(_)
                | Self::Io { .. }
                | Self::Serialization { .. }
                | Self::Config(_)
                | Self::Internal(_)
        )
    }

    /// True when the request was rejected by a local rule.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::SlotOccupied { .. }
                | Self::SessionInactive(_)
                | Self::PermissionDenied(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PairUpError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PairUpError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PairUpError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for PairUpError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PairUpError>`.
pub type Result<T> = std::result::Result<T, PairUpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_disjoint() {
        let backend = PairUpError::data_access("timeout");
        assert!(backend.is_backend_failure());
        assert!(!backend.is_validation_failure());

        let occupied = PairUpError::SlotOccupied {
            slot: Slot::Navigator,
        };
        assert!(occupied.is_validation_failure());
        assert!(!occupied.is_backend_failure());
        assert!(occupied.is_slot_occupied());
    }

    #[test]
    fn test_not_found_is_neither() {
        let err = PairUpError::not_found("session", "abc");
        assert!(err.is_not_found());
        assert!(!err.is_backend_failure());
        assert!(!err.is_validation_failure());
        assert_eq!(err.to_string(), "Entity not found: session 'abc'");
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: PairUpError = io.into();
        match err {
            PairUpError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
