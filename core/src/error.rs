//! Error taxonomy for lab operations
//!
//! Every fallible operation in the core returns [`LabError`]. The variants
//! map onto a small set of [`ErrorKind`]s which decide how a lab reacts:
//! precondition failures are surfaced to the user, rejected input is
//! swallowed, degenerate geometry never leaves the engine that found it.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Comprehensive error type for lab operations
#[derive(Debug, Error)]
pub enum LabError {
    #[error("{0}")]
    PreconditionFailed(String),

    #[error("Position ({x:.2}, {y:.2}) is outside the data domain")]
    OutOfBounds { x: f64, y: f64 },

    #[error("Position ({x:.2}, {y:.2}) is within {min_separation} of an existing point")]
    TooClose { x: f64, y: f64, min_separation: f64 },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Unknown preset '{preset}' for lab {lab}")]
    UnknownPreset { lab: String, preset: String },

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Configuration file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification used by labs to decide propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Requires user action; reported in the read model
    PreconditionFailed,
    /// Ordinary input at the domain boundary; silently ignored
    InputRejected,
    /// Numeric corner case; resolved with a fallback inside the engine
    DegenerateGeometry,
    /// Malformed host command or parameter
    InvalidCommand,
    /// Bad tuning constants or unreadable configuration
    Configuration,
}

impl LabError {
    /// Classifies the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LabError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,
            LabError::OutOfBounds { .. } | LabError::TooClose { .. } => ErrorKind::InputRejected,
            LabError::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
            LabError::InvalidParameter { .. }
            | LabError::UnknownAction(_)
            | LabError::UnknownPreset { .. }
            | LabError::UnknownEntity(_) => ErrorKind::InvalidCommand,
            LabError::Configuration(_) | LabError::Io(_) | LabError::Serialization(_) => {
                ErrorKind::Configuration
            }
        }
    }

    /// Whether the host should show this error to the user
    pub fn is_user_visible(&self) -> bool {
        self.kind() == ErrorKind::PreconditionFailed
    }

    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        LabError::InvalidParameter {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

pub type LabResult<T> = Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            LabError::PreconditionFailed("need points".into()).kind(),
            ErrorKind::PreconditionFailed
        );
        assert_eq!(LabError::OutOfBounds { x: -1.0, y: 0.0 }.kind(), ErrorKind::InputRejected);
        assert_eq!(
            LabError::TooClose { x: 1.0, y: 1.0, min_separation: 0.3 }.kind(),
            ErrorKind::InputRejected
        );
        assert_eq!(LabError::UnknownAction("fly".into()).kind(), ErrorKind::InvalidCommand);
    }

    #[test]
    fn test_only_preconditions_are_user_visible() {
        assert!(LabError::PreconditionFailed("x".into()).is_user_visible());
        assert!(!LabError::OutOfBounds { x: 11.0, y: 0.0 }.is_user_visible());
        assert!(!LabError::DegenerateGeometry("zero norm".into()).is_user_visible());
    }
}
