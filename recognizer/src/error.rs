//! Error types for the gesture recognizer.

use thiserror::Error;

use crate::hand::LANDMARK_COUNT;

/// A landmark list that cannot describe a hand.
///
/// An empty list is not an error: it means no hand was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandmarkError {
    /// The list is neither empty nor a full hand.
    #[error("expected 0 or {} landmarks, got {got}", LANDMARK_COUNT)]
    WrongCount { got: usize },

    /// A landmark id outside the 21-point hand topology.
    #[error("landmark id {id} out of range (0..{})", LANDMARK_COUNT)]
    IdOutOfRange { id: usize },

    /// The same landmark id appears twice.
    #[error("duplicate landmark id {id}")]
    DuplicateId { id: usize },
}

/// Threshold configuration problems.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key} must be finite, got {value}")]
    NotFinite { key: &'static str, value: f32 },

    #[error("{key} must not be negative, got {value}")]
    Negative { key: &'static str, value: f32 },

    #[error("missing config key :{key}")]
    MissingKey { key: &'static str },

    #[error("malformed config: {0}")]
    Malformed(String),
}

/// Failure to decode one frame line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("malformed s-expression: {0}")]
    Malformed(String),

    #[error("missing key :{key}")]
    MissingKey { key: &'static str },

    /// A landmark entry is not `(id x y [z])`.
    #[error("landmark entry {position}: {reason}")]
    BadLandmark { position: usize, reason: String },

    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}
