//! Error handling module
//!
//! Defines the error types raised by the translation engine. Every failure
//! is returned to the single call site that invoked decode, encode or
//! translate; the engine never retries and never drops a packet silently.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::protocol::revision::ProtocolRevision;
use crate::translate::mapping::LookupDirection;

/// Main error type for the protocol bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Malformed or unrecognized bytes (decode violation)
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Caller supplied an internally inconsistent packet
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// Identifier translation failed
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Block palette source errors
    #[error("Palette error: {0}")]
    Palette(#[from] PaletteError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Decode violations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Insufficient data for '{field}': expected {expected} bytes, got {actual}")]
    InsufficientData {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unexpected block action type {0}")]
    UnknownBlockAction(i32),

    #[error("Unexpected item stack request action type {0}")]
    UnknownStackRequestAction(u8),

    #[error("Unexpected inventory source type {0}")]
    UnknownInventorySource(u32),

    #[error("Packet too large: {size} bytes (max: {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("Unsupported protocol revision {0}")]
    UnsupportedRevision(ProtocolRevision),
}

/// Construction contract violations, raised before any bytes are produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Gaze direction must be provided for VR play mode")]
    MissingGazeDirection,
}

/// Identifier translation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("No {direction} entry for id {id} in revision {revision}")]
    IdLookupMiss {
        revision: ProtocolRevision,
        id: u32,
        direction: LookupDirection,
    },

    #[error("Field '{field}' carries negative identifier {value}")]
    NegativeIdentifier { field: &'static str, value: i64 },

    #[error("No block state mapping loaded for revision {0}")]
    NoMapping(ProtocolRevision),

    #[error("Duplicate {direction} entry for id {id} in revision {revision}")]
    DuplicateEntry {
        revision: ProtocolRevision,
        id: u32,
        direction: LookupDirection,
    },
}

/// Block palette loading errors
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Palette not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Palette {} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Palette {} declares revision {found}, expected {expected}", path.display())]
    RevisionMismatch {
        path: PathBuf,
        expected: ProtocolRevision,
        found: ProtocolRevision,
    },

    #[error("No palette provided for revision {0}")]
    Missing(ProtocolRevision),
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::InsufficientData {
            field: "pitch",
            expected: 4,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data for 'pitch': expected 4 bytes, got 1"
        );

        let err = ProtocolError::UnknownBlockAction(99);
        assert_eq!(err.to_string(), "Unexpected block action type 99");

        let err = TranslationError::IdLookupMiss {
            revision: ProtocolRevision::V1_21_0,
            id: 42,
            direction: LookupDirection::ToRuntime,
        };
        assert_eq!(
            err.to_string(),
            "No version-to-runtime entry for id 42 in revision 685"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: BridgeError = ConstructionError::MissingGazeDirection.into();
        assert!(matches!(
            err,
            BridgeError::Construction(ConstructionError::MissingGazeDirection)
        ));

        let err: BridgeError = ProtocolError::UnknownStackRequestAction(7).into();
        assert_eq!(
            err.to_string(),
            "Protocol error: Unexpected item stack request action type 7"
        );
    }
}
