//! Frame-to-frame gesture tracking on top of the stateless classifier.
//!
//! Turns a stream of per-frame classifications into Started / Held /
//! Released events with debouncing and hold-duration tracking. Purely a
//! consumer of classifier output; nothing here feeds back into it.
//! Frames the caller could not classify go through `reject` and end the
//! live gesture like a lost hand.

use tracing::debug;

use crate::gesture::{AuxMeasurements, Classification, Gesture};

// ── Events ─────────────────────────────────────────────────

/// Events emitted by the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A gesture has just been recognized.
    Started {
        gesture: Gesture,
        measurements: AuxMeasurements,
    },
    /// A gesture has been held past the hold threshold.
    Held { gesture: Gesture, duration_ms: f64 },
    /// A previously active gesture was released.
    Released { gesture: Gesture },
}

impl GestureEvent {
    pub fn gesture(&self) -> Gesture {
        match self {
            Self::Started { gesture, .. }
            | Self::Held { gesture, .. }
            | Self::Released { gesture } => *gesture,
        }
    }

    /// Event name for the wire protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started { .. } => "gesture-started",
            Self::Held { .. } => "gesture-held",
            Self::Released { .. } => "gesture-released",
        }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Timing thresholds for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Idle time (ms) required before a new gesture can start.
    pub debounce_ms: f64,
    /// Time (ms) before a Started gesture emits Held.
    pub hold_threshold_ms: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100.0,
            hold_threshold_ms: 300.0,
        }
    }
}

// ── State ──────────────────────────────────────────────────

/// Where the tracker is between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    /// No gesture live; `idle_ms` since the last release (or since start).
    Idle { idle_ms: f64 },
    /// A gesture is live.
    Active {
        gesture: Gesture,
        held_ms: f64,
        held_reported: bool,
    },
}

/// Tracks the gesture of a single hand across frames.
///
/// Only the latest frame counts: a frame with no hand, a `Neutral` frame
/// or a rejected frame all end the live gesture.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    pub config: TrackerConfig,
    phase: Phase,
}

impl GestureTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle { idle_ms: 0.0 },
        }
    }

    /// Feed one frame's classification, `dt_ms` after the previous frame.
    pub fn update(&mut self, classification: &Classification, dt_ms: f64) -> Vec<GestureEvent> {
        let seen = match classification.gesture {
            Gesture::Neutral => None,
            g => Some(g),
        };
        self.step(seen, &classification.aux, dt_ms)
    }

    /// A frame arrived but could not be classified. The hand is treated as
    /// lost.
    pub fn reject(&mut self, dt_ms: f64) -> Vec<GestureEvent> {
        self.step(None, &AuxMeasurements::new(), dt_ms)
    }

    fn step(
        &mut self,
        seen: Option<Gesture>,
        aux: &AuxMeasurements,
        dt_ms: f64,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();

        self.phase = match (self.phase, seen) {
            (Phase::Idle { idle_ms }, None) => Phase::Idle {
                idle_ms: idle_ms + dt_ms,
            },
            (Phase::Idle { idle_ms }, Some(gesture)) => {
                let idle_ms = idle_ms + dt_ms;
                if idle_ms < self.config.debounce_ms {
                    Phase::Idle { idle_ms }
                } else {
                    debug!(gesture = gesture.as_str(), idle_ms, "gesture started");
                    events.push(started(gesture, aux));
                    Phase::Active {
                        gesture,
                        held_ms: 0.0,
                        held_reported: false,
                    }
                }
            }
            (
                Phase::Active {
                    gesture,
                    held_ms,
                    held_reported,
                },
                Some(same),
            ) if same == gesture => {
                let held_ms = held_ms + dt_ms;
                let crossed = !held_reported && held_ms >= self.config.hold_threshold_ms;
                if crossed {
                    events.push(GestureEvent::Held {
                        gesture,
                        duration_ms: held_ms,
                    });
                }
                Phase::Active {
                    gesture,
                    held_ms,
                    held_reported: held_reported || crossed,
                }
            }
            (Phase::Active { gesture, held_ms, .. }, next) => {
                debug!(gesture = gesture.as_str(), held_ms, "gesture released");
                events.push(GestureEvent::Released { gesture });
                match next {
                    // Switching hand shapes skips the debounce window.
                    Some(next) => {
                        events.push(started(next, aux));
                        Phase::Active {
                            gesture: next,
                            held_ms: 0.0,
                            held_reported: false,
                        }
                    }
                    None => Phase::Idle { idle_ms: 0.0 },
                }
            }
        };

        events
    }

    pub fn active(&self) -> Option<Gesture> {
        match self.phase {
            Phase::Active { gesture, .. } => Some(gesture),
            Phase::Idle { .. } => None,
        }
    }

    pub fn is_active(&self, gesture: Gesture) -> bool {
        self.active() == Some(gesture)
    }

    /// How long the live gesture has been held, 0 when idle.
    pub fn held_ms(&self) -> f64 {
        match self.phase {
            Phase::Active { held_ms, .. } => held_ms,
            Phase::Idle { .. } => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle { idle_ms: 0.0 };
    }

    /// Generate s-expression for tracker status.
    pub fn status_sexp(&self) -> String {
        let gesture = self
            .active()
            .map(|g| format!(":{}", g.as_str()))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:gesture {} :hold-ms {:.0} :debounce-ms {:.0} :hold-threshold-ms {:.0})",
            gesture,
            self.held_ms(),
            self.config.debounce_ms,
            self.config.hold_threshold_ms,
        )
    }
}

fn started(gesture: Gesture, aux: &AuxMeasurements) -> GestureEvent {
    GestureEvent::Started {
        gesture,
        measurements: aux.clone(),
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

// ── Test helpers ───────────────────────────────────────────

#[cfg(test)]
fn frame(gesture: Gesture) -> Classification {
    Classification {
        gesture,
        aux: AuxMeasurements::new(),
        rule: None,
    }
}

#[cfg(test)]
fn no_debounce() -> GestureTracker {
    GestureTracker::new(TrackerConfig {
        debounce_ms: 0.0,
        hold_threshold_ms: 300.0,
    })
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker() {
        let tracker = GestureTracker::default();
        assert!(tracker.active().is_none());
        assert!((tracker.config.debounce_ms - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_start_event() {
        let mut tracker = no_debounce();
        let events = tracker.update(&frame(Gesture::Scroll), 16.0);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GestureEvent::Started { gesture: Gesture::Scroll, .. })),
            "Expected scroll started, got {:?}",
            events,
        );
        assert!(tracker.is_active(Gesture::Scroll));
    }

    #[test]
    fn test_neutral_is_no_gesture() {
        let mut tracker = no_debounce();
        let events = tracker.update(&frame(Gesture::Neutral), 16.0);
        assert!(events.is_empty());
        assert!(tracker.active().is_none());
    }

    #[test]
    fn test_click_measurements_carried() {
        let mut tracker = no_debounce();
        let click = Classification {
            gesture: Gesture::Click,
            aux: AuxMeasurements::new().with("distance", 4.0),
            rule: None,
        };
        let events = tracker.update(&click, 16.0);
        match &events[0] {
            GestureEvent::Started { measurements, .. } => {
                assert_eq!(measurements.get("distance"), Some(4.0));
            }
            other => panic!("Expected Started, got {:?}", other),
        }
    }

    #[test]
    fn test_release_on_neutral() {
        let mut tracker = no_debounce();
        tracker.update(&frame(Gesture::Pause), 16.0);
        let events = tracker.update(&frame(Gesture::Neutral), 16.0);
        assert_eq!(
            events,
            vec![GestureEvent::Released {
                gesture: Gesture::Pause
            }]
        );
        assert!(tracker.active().is_none());
    }

    #[test]
    fn test_direct_switch_releases_then_starts() {
        let mut tracker = GestureTracker::new(TrackerConfig {
            debounce_ms: 0.0,
            hold_threshold_ms: 300.0,
        });
        tracker.update(&frame(Gesture::Move), 16.0);
        tracker.config.debounce_ms = 1000.0;
        let events = tracker.update(&frame(Gesture::Click), 16.0);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_str(), "gesture-released");
        assert_eq!(events[0].gesture(), Gesture::Move);
        assert_eq!(events[1].as_str(), "gesture-started");
        assert_eq!(events[1].gesture(), Gesture::Click);
    }

    #[test]
    fn test_hold_event_once() {
        let mut tracker = GestureTracker::new(TrackerConfig {
            debounce_ms: 0.0,
            hold_threshold_ms: 100.0,
        });
        tracker.update(&frame(Gesture::Volume), 16.0);

        let events = tracker.update(&frame(Gesture::Volume), 50.0);
        assert!(
            !events.iter().any(|e| matches!(e, GestureEvent::Held { .. })),
            "Should not emit Held yet",
        );

        let events = tracker.update(&frame(Gesture::Volume), 60.0);
        assert!(
            events.iter().any(|e| matches!(e, GestureEvent::Held { .. })),
            "Expected Held event, got {:?}",
            events,
        );

        let events = tracker.update(&frame(Gesture::Volume), 60.0);
        assert!(events.is_empty(), "Held is emitted once, got {:?}", events);
    }

    #[test]
    fn test_debounce() {
        let mut tracker = GestureTracker::new(TrackerConfig {
            debounce_ms: 200.0,
            hold_threshold_ms: 300.0,
        });

        let events = tracker.update(&frame(Gesture::Click), 150.0);
        assert!(events.is_empty(), "Should be debounced, got {:?}", events);

        // Idle time keeps accumulating while the pinch waits out the window.
        let events = tracker.update(&frame(Gesture::Click), 60.0);
        assert!(
            events.iter().any(|e| matches!(e, GestureEvent::Started { .. })),
            "Should start after debounce, got {:?}",
            events,
        );
    }

    #[test]
    fn test_flicker_is_suppressed() {
        let mut tracker = GestureTracker::new(TrackerConfig {
            debounce_ms: 100.0,
            hold_threshold_ms: 300.0,
        });
        for _ in 0..7 {
            tracker.update(&frame(Gesture::Neutral), 16.0);
        }
        assert_eq!(tracker.update(&frame(Gesture::Click), 16.0).len(), 1);
        assert_eq!(tracker.update(&frame(Gesture::Neutral), 16.0).len(), 1);
        // Click right after release is inside the debounce window.
        assert!(tracker.update(&frame(Gesture::Click), 16.0).is_empty());
    }

    #[test]
    fn test_reset() {
        let mut tracker = no_debounce();
        tracker.update(&frame(Gesture::Seek), 16.0);
        tracker.update(&frame(Gesture::Seek), 500.0);
        assert_eq!(tracker.held_ms(), 500.0);
        tracker.reset();
        assert!(tracker.active().is_none());
        assert_eq!(tracker.held_ms(), 0.0);
        assert_eq!(tracker.config.debounce_ms, 0.0);
    }

    #[test]
    fn test_rejected_frame_releases() {
        let mut tracker = no_debounce();
        tracker.update(&frame(Gesture::Scroll), 16.0);
        let events = tracker.reject(16.0);
        assert_eq!(
            events,
            vec![GestureEvent::Released {
                gesture: Gesture::Scroll
            }]
        );
        assert!(tracker.active().is_none());
        assert!(tracker.reject(16.0).is_empty());
    }

    #[test]
    fn test_lost_hand_releases() {
        let mut tracker = no_debounce();
        tracker.update(&frame(Gesture::Move), 16.0);
        let events = tracker.update(&Classification::no_hand(), 16.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_str(), "gesture-released");
    }

    #[test]
    fn test_rejected_frames_count_as_idle_time() {
        let mut tracker = GestureTracker::new(TrackerConfig {
            debounce_ms: 100.0,
            hold_threshold_ms: 300.0,
        });
        tracker.reject(60.0);
        tracker.reject(30.0);
        let events = tracker.update(&frame(Gesture::Pause), 16.0);
        assert_eq!(events.len(), 1);
        assert!(tracker.is_active(Gesture::Pause));
    }

    #[test]
    fn test_status_sexp() {
        let mut tracker = no_debounce();
        assert!(tracker.status_sexp().contains(":gesture nil"));
        tracker.update(&frame(Gesture::VolUp), 16.0);
        let sexp = tracker.status_sexp();
        assert!(sexp.contains(":gesture :vol-up"));
        assert!(sexp.contains(":hold-threshold-ms 300"));
    }
}
