//! Hand landmark topology and per-frame landmark sets.
//!
//! Models the 21-point hand layout produced by common hand-landmark
//! models: wrist at 0, then a four-point chain per finger ending in the
//! tips {4, 8, 12, 16, 20}. Coordinates are image pixels (y grows down).

use crate::error::LandmarkError;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in model index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// All landmarks in index order.
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Convert landmark enum to model index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// Fingertip landmarks, thumb first.
    pub fn fingertip_landmarks() -> [HandLandmark; 5] {
        [
            Self::ThumbTip,
            Self::IndexTip,
            Self::MiddleTip,
            Self::RingTip,
            Self::PinkyTip,
        ]
    }
}

// ── Fingers ────────────────────────────────────────────────

/// The four fingers that take part in the up/down extension vector.
///
/// The thumb is deliberately absent: its vertical position does not say
/// much once the hand rotates, so it only contributes through distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// Extension vector order.
    pub const ALL: [Finger; 4] = [Self::Index, Self::Middle, Self::Ring, Self::Pinky];

    pub fn tip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexTip,
            Self::Middle => HandLandmark::MiddleTip,
            Self::Ring => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }

    /// The joint two below the tip, compared against for extension.
    pub fn pip(&self) -> HandLandmark {
        match self {
            Self::Index => HandLandmark::IndexPip,
            Self::Middle => HandLandmark::MiddlePip,
            Self::Ring => HandLandmark::RingPip,
            Self::Pinky => HandLandmark::PinkyPip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }
}

// ── Landmarks ──────────────────────────────────────────────

/// One tracked point as delivered by the landmark model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    /// Model index (0-20).
    pub id: usize,
    /// Pixel column.
    pub x: f32,
    /// Pixel row (grows downward).
    pub y: f32,
    /// Relative depth. Carried through, never used for classification.
    pub z: f32,
}

impl Landmark {
    pub fn new(id: usize, x: f32, y: f32) -> Self {
        Self { id, x, y, z: 0.0 }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}

/// Euclidean distance between two image points.
pub fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}

/// One frame of landmarks: either no hand, or a complete 21-point hand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LandmarkSet {
    hand: Option<[Landmark; LANDMARK_COUNT]>,
}

impl LandmarkSet {
    /// A frame in which no hand was detected.
    pub fn empty() -> Self {
        Self { hand: None }
    }

    /// Validate a landmark list and arrange it by id.
    ///
    /// Accepts the list in any order as long as every id in 0..21 appears
    /// exactly once. An empty list yields an empty set.
    pub fn new(landmarks: &[Landmark]) -> Result<Self, LandmarkError> {
        if landmarks.is_empty() {
            return Ok(Self::empty());
        }
        if landmarks.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                got: landmarks.len(),
            });
        }

        let mut slots: [Option<Landmark>; LANDMARK_COUNT] = [None; LANDMARK_COUNT];
        for lm in landmarks {
            let slot = slots
                .get_mut(lm.id)
                .ok_or(LandmarkError::IdOutOfRange { id: lm.id })?;
            if slot.is_some() {
                return Err(LandmarkError::DuplicateId { id: lm.id });
            }
            *slot = Some(*lm);
        }

        // 21 distinct in-range ids means every slot is filled.
        let mut hand = [Landmark::default(); LANDMARK_COUNT];
        for (dst, src) in hand.iter_mut().zip(slots) {
            *dst = src.ok_or(LandmarkError::WrongCount {
                got: landmarks.len(),
            })?;
        }
        Ok(Self { hand: Some(hand) })
    }

    /// Build a set from bare (x, y) points, ids taken from position.
    pub fn from_points(points: &[[f32; 2]]) -> Result<Self, LandmarkError> {
        let landmarks: Vec<Landmark> = points
            .iter()
            .enumerate()
            .map(|(id, p)| Landmark::new(id, p[0], p[1]))
            .collect();
        Self::new(&landmarks)
    }

    pub fn is_empty(&self) -> bool {
        self.hand.is_none()
    }

    /// The full hand, or `None` when no hand was detected.
    pub fn hand(&self) -> Option<&[Landmark; LANDMARK_COUNT]> {
        self.hand.as_ref()
    }

    pub fn get(&self, landmark: HandLandmark) -> Option<&Landmark> {
        self.hand.as_ref().map(|h| &h[landmark.index()])
    }

    /// Distance between two landmarks, `None` when no hand is present.
    pub fn landmark_distance(&self, a: HandLandmark, b: HandLandmark) -> Option<f32> {
        let hand = self.hand.as_ref()?;
        Some(distance(
            hand[a.index()].position(),
            hand[b.index()].position(),
        ))
    }
}

/// A straight hand, all fingers up, wrist at the bottom.
#[cfg(test)]
pub(crate) fn test_points_open() -> Vec<[f32; 2]> {
    let mut pts = vec![[0.0f32, 0.0]; LANDMARK_COUNT];
    pts[HandLandmark::Wrist.index()] = [200.0, 400.0];
    for (finger, x) in [(1usize, 120.0f32), (5, 160.0), (9, 200.0), (13, 240.0), (17, 280.0)] {
        for k in 0..4 {
            pts[finger + k] = [x, 340.0 - 40.0 * k as f32];
        }
    }
    pts
}

// ── Tests ──────────────────────────────────────────────────
