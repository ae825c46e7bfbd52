//! Gesture classification from a single frame of hand landmarks.
//!
//! Extracts finger extension, pinch distances and pointing vectors from a
//! `LandmarkSet`, then walks `RULE_ORDER` top to bottom; the first rule
//! that fires decides the gesture. Stateless: every call stands alone.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use crate::config::ThresholdConfig;
use crate::error::LandmarkError;
use crate::hand::{distance, Finger, HandLandmark, Landmark, LandmarkSet, LANDMARK_COUNT};

// ── Gesture types ──────────────────────────────────────────

/// Gesture symbols, one per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gesture {
    /// Nothing recognized, or no hand.
    Neutral,
    /// Index finger up alone: cursor follows the fingertip.
    Move,
    /// Thumb and index tips pinched.
    Click,
    /// Thumb and middle tips pinched.
    RightClick,
    /// Fist.
    Pause,
    /// Index and middle up.
    Scroll,
    /// Pinky up alone.
    Volume,
    /// Index, middle and ring up.
    Seek,
    /// Index pointing right.
    VidFwd,
    /// Index pointing left.
    VidBwd,
    /// Thumb pointing up with the index curled.
    VolUp,
    /// Index pointing down.
    VolDown,
}

impl Gesture {
    pub const ALL: [Gesture; 12] = [
        Self::Neutral,
        Self::Move,
        Self::Click,
        Self::RightClick,
        Self::Pause,
        Self::Scroll,
        Self::Volume,
        Self::Seek,
        Self::VidFwd,
        Self::VidBwd,
        Self::VolUp,
        Self::VolDown,
    ];

    /// String representation for the wire protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Move => "move",
            Self::Click => "click",
            Self::RightClick => "right-click",
            Self::Pause => "pause",
            Self::Scroll => "scroll",
            Self::Volume => "volume",
            Self::Seek => "seek",
            Self::VidFwd => "vid-fwd",
            Self::VidBwd => "vid-bwd",
            Self::VolUp => "vol-up",
            Self::VolDown => "vol-down",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.as_str() == name)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Measurements ───────────────────────────────────────────

/// Aux key for the pinch distance behind a click.
pub const AUX_DISTANCE: &str = "distance";
/// Aux key for thumb-index tip distance on a neutral frame.
pub const AUX_DISTANCE_IDX: &str = "distance_idx";
/// Aux key for thumb-middle tip distance on a neutral frame.
pub const AUX_DISTANCE_MID: &str = "distance_mid";

/// Named distances that explain a decision. Telemetry only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuxMeasurements {
    values: BTreeMap<&'static str, f32>,
}

impl AuxMeasurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: f32) -> Self {
        self.values.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub gesture: Gesture,
    pub aux: AuxMeasurements,
    /// The rule that fired; `None` for no hand or the neutral fallback.
    pub rule: Option<Rule>,
}

impl Classification {
    /// Outcome for a frame without a hand.
    pub fn no_hand() -> Self {
        Self {
            gesture: Gesture::Neutral,
            aux: AuxMeasurements::new(),
            rule: None,
        }
    }

    pub fn into_parts(self) -> (Gesture, AuxMeasurements) {
        (self.gesture, self.aux)
    }
}

// ── Features ───────────────────────────────────────────────

/// Up/down state of [index, middle, ring, pinky].
pub type FingerPattern = [bool; 4];

pub const FIST: FingerPattern = [false, false, false, false];
pub const SCROLL_PATTERN: FingerPattern = [true, true, false, false];
pub const VOLUME_PATTERN: FingerPattern = [false, false, false, true];
pub const MOVE_PATTERN: FingerPattern = [true, false, false, false];

/// Geometry the rules decide on.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFeatures {
    /// Extension flags in `Finger::ALL` order.
    pub extended: FingerPattern,
    /// Thumb tip to index tip.
    pub dist_idx: f32,
    /// Thumb tip to middle tip.
    pub dist_mid: f32,
    /// Index tip minus index MCP.
    pub index_vector: [f32; 2],
    /// Thumb tip minus thumb MCP.
    pub thumb_vector: [f32; 2],
}

impl HandFeatures {
    pub fn extract(hand: &[Landmark; LANDMARK_COUNT]) -> Self {
        let at = |lm: HandLandmark| hand[lm.index()].position();

        // A finger is up when its tip sits above its PIP joint.
        let mut extended = FIST;
        for (flag, finger) in extended.iter_mut().zip(Finger::ALL) {
            *flag = at(finger.tip())[1] < at(finger.pip())[1];
        }

        let thumb_tip = at(HandLandmark::ThumbTip);
        let index_tip = at(HandLandmark::IndexTip);
        let index_mcp = at(HandLandmark::IndexMcp);
        let thumb_mcp = at(HandLandmark::ThumbMcp);

        Self {
            extended,
            dist_idx: distance(index_tip, thumb_tip),
            dist_mid: distance(at(HandLandmark::MiddleTip), thumb_tip),
            index_vector: [index_tip[0] - index_mcp[0], index_tip[1] - index_mcp[1]],
            thumb_vector: [thumb_tip[0] - thumb_mcp[0], thumb_tip[1] - thumb_mcp[1]],
        }
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.extended[finger as usize]
    }

    /// Length of the index pointing vector.
    pub fn index_extension(&self) -> f32 {
        distance([0.0, 0.0], self.index_vector)
    }

    /// Length of the thumb pointing vector.
    pub fn thumb_extension(&self) -> f32 {
        distance([0.0, 0.0], self.thumb_vector)
    }
}

// ── Rules ──────────────────────────────────────────────────

/// One step of the decision cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Thumb-index pinch.
    Click,
    /// Thumb-middle pinch.
    RightClick,
    /// Index pointing left, right or down.
    IndexPointing,
    /// Thumb pointing up with the index curled.
    ThumbUp,
    Fist,
    Scroll,
    Volume,
    Seek,
    Move,
}

/// Evaluation order. Proximity beats pointing, pointing beats finger
/// patterns; the first rule that fires wins.
pub const RULE_ORDER: [Rule; 9] = [
    Rule::Click,
    Rule::RightClick,
    Rule::IndexPointing,
    Rule::ThumbUp,
    Rule::Fist,
    Rule::Scroll,
    Rule::Volume,
    Rule::Seek,
    Rule::Move,
];

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::RightClick => "right-click",
            Self::IndexPointing => "index-pointing",
            Self::ThumbUp => "thumb-up",
            Self::Fist => "fist",
            Self::Scroll => "scroll",
            Self::Volume => "volume",
            Self::Seek => "seek",
            Self::Move => "move",
        }
    }

    /// Gestures this rule can produce.
    pub fn gestures(&self) -> &'static [Gesture] {
        match self {
            Self::Click => &[Gesture::Click],
            Self::RightClick => &[Gesture::RightClick],
            Self::IndexPointing => &[Gesture::VidFwd, Gesture::VidBwd, Gesture::VolDown],
            Self::ThumbUp => &[Gesture::VolUp],
            Self::Fist => &[Gesture::Pause],
            Self::Scroll => &[Gesture::Scroll],
            Self::Volume => &[Gesture::Volume],
            Self::Seek => &[Gesture::Seek],
            Self::Move => &[Gesture::Move],
        }
    }

    /// Apply this rule alone. `None` means fall through to the next one.
    pub fn evaluate(
        &self,
        features: &HandFeatures,
        config: &ThresholdConfig,
    ) -> Option<(Gesture, AuxMeasurements)> {
        let click = config.click_distance_threshold;
        let extension = config.gesture_extension_threshold;
        let e = &features.extended;

        let gesture = match self {
            Self::Click => {
                return (features.dist_idx < click).then(|| {
                    let aux = AuxMeasurements::new().with(AUX_DISTANCE, features.dist_idx);
                    (Gesture::Click, aux)
                });
            }
            Self::RightClick => {
                return (features.dist_mid < click).then(|| {
                    let aux = AuxMeasurements::new().with(AUX_DISTANCE, features.dist_mid);
                    (Gesture::RightClick, aux)
                });
            }
            Self::IndexPointing => {
                if features.index_extension() <= extension {
                    return None;
                }
                let [dx, dy] = features.index_vector;
                if dx.abs() > dy.abs() {
                    if dx > 0.0 {
                        Gesture::VidFwd
                    } else {
                        Gesture::VidBwd
                    }
                } else if dy > 0.0 {
                    Gesture::VolDown
                } else {
                    // Pointing up: no directional symbol, leave it to the
                    // finger patterns.
                    return None;
                }
            }
            Self::ThumbUp => {
                let [dx, dy] = features.thumb_vector;
                let fires = !features.is_extended(Finger::Index)
                    && features.thumb_extension() > extension
                    && dy.abs() > dx.abs()
                    && dy < 0.0;
                if !fires {
                    return None;
                }
                Gesture::VolUp
            }
            Self::Fist if *e == FIST => Gesture::Pause,
            Self::Scroll if *e == SCROLL_PATTERN => Gesture::Scroll,
            Self::Volume if *e == VOLUME_PATTERN => Gesture::Volume,
            Self::Seek if e[0] && e[1] && e[2] => Gesture::Seek,
            Self::Move if *e == MOVE_PATTERN => Gesture::Move,
            _ => return None,
        };
        Some((gesture, AuxMeasurements::new()))
    }
}

// ── Classification ─────────────────────────────────────────

/// Run the cascade over already-extracted features.
pub fn classify_features(features: &HandFeatures, config: &ThresholdConfig) -> Classification {
    for rule in RULE_ORDER {
        if let Some((gesture, aux)) = rule.evaluate(features, config) {
            trace!(rule = rule.as_str(), gesture = gesture.as_str(), "rule fired");
            return Classification {
                gesture,
                aux,
                rule: Some(rule),
            };
        }
    }
    trace!(extended = ?features.extended, "no rule fired");
    Classification {
        gesture: Gesture::Neutral,
        aux: AuxMeasurements::new()
            .with(AUX_DISTANCE_IDX, features.dist_idx)
            .with(AUX_DISTANCE_MID, features.dist_mid),
        rule: None,
    }
}

/// Classify a validated landmark set. An empty set is `Neutral`.
pub fn classify_set(landmarks: &LandmarkSet, config: &ThresholdConfig) -> Classification {
    match landmarks.hand() {
        Some(hand) => classify_features(&HandFeatures::extract(hand), config),
        None => Classification::no_hand(),
    }
}

/// Classify a raw landmark list.
///
/// An empty list is `Neutral` with no measurements. Anything other than
/// 0 or 21 landmarks with distinct ids is rejected before any geometry
/// is computed.
pub fn classify(
    landmarks: &[Landmark],
    config: &ThresholdConfig,
) -> Result<Classification, LandmarkError> {
    let set = LandmarkSet::new(landmarks)?;
    Ok(classify_set(&set, config))
}

/// Classifier bound to one threshold configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureClassifier {
    config: ThresholdConfig,
}

impl GestureClassifier {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    pub fn classify(&self, landmarks: &[Landmark]) -> Result<Classification, LandmarkError> {
        classify(landmarks, &self.config)
    }

    pub fn classify_set(&self, landmarks: &LandmarkSet) -> Classification {
        classify_set(landmarks, &self.config)
    }
}

// ── Test helpers ───────────────────────────────────────────

/// A relaxed hand: every finger curled, thumb tucked, tips apart.
///
/// Finger columns sit at x = 170, 200, 230, 260 with MCP y=300,
/// PIP y=270, DIP y=280 and tip y=290.
#[cfg(test)]
fn curled_hand() -> Vec<[f32; 2]> {
    let mut pts = vec![[0.0f32, 0.0]; LANDMARK_COUNT];
    pts[HandLandmark::Wrist.index()] = [200.0, 400.0];
    pts[HandLandmark::ThumbCmc.index()] = [150.0, 380.0];
    pts[HandLandmark::ThumbMcp.index()] = [130.0, 350.0];
    pts[HandLandmark::ThumbIp.index()] = [120.0, 330.0];
    pts[HandLandmark::ThumbTip.index()] = [115.0, 315.0];
    for (finger, x) in Finger::ALL.iter().zip([170.0f32, 200.0, 230.0, 260.0]) {
        let tip = finger.tip().index();
        pts[tip - 3] = [x, 300.0];
        pts[tip - 2] = [x, 270.0];
        pts[tip - 1] = [x, 280.0];
        pts[tip] = [x, 290.0];
    }
    pts
}

#[cfg(test)]
fn set_point(pts: &mut [[f32; 2]], lm: HandLandmark, x: f32, y: f32) {
    pts[lm.index()] = [x, y];
}

/// Raise a finger's tip above its PIP, keeping it short of the extension
/// threshold used in tests.
#[cfg(test)]
fn raise(pts: &mut [[f32; 2]], finger: Finger) {
    pts[finger.tip().index()][1] = 240.0;
}

#[cfg(test)]
fn thresholds() -> ThresholdConfig {
    ThresholdConfig::new(20.0, 100.0).unwrap()
}

#[cfg(test)]
fn run(pts: &[[f32; 2]]) -> Classification {
    let set = LandmarkSet::from_points(pts).unwrap();
    classify_set(&set, &thresholds())
}

// ── Tests ──────────────────────────────────────────────────
