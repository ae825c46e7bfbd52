//! Hand gesture recognizer.
//!
//! Classifies one frame of 21 hand landmarks into a control gesture
//! (cursor move, clicks, scroll, volume, media seek). The classifier is a
//! pure function of the landmarks and a `ThresholdConfig`; the optional
//! `GestureTracker` adds debounce and hold tracking across frames.

pub mod config;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod sexp;
pub mod tracker;

pub use config::ThresholdConfig;
pub use error::{ConfigError, FrameError, LandmarkError};
pub use gesture::{
    classify, classify_set, AuxMeasurements, Classification, Gesture, GestureClassifier,
    HandFeatures, Rule, RULE_ORDER,
};
pub use hand::{HandLandmark, Landmark, LandmarkSet, LANDMARK_COUNT};
pub use tracker::{GestureEvent, GestureTracker, TrackerConfig};
