//! Landmark, hand and detection-frame types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices (MediaPipe hand model)
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Named positions in a [`HandFrame`]'s landmark array.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Skeleton edges between landmarks, for drawing connectors.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // thumb
    (0, 1), (1, 2), (2, 3), (3, 4),
    // index
    (0, 5), (5, 6), (6, 7), (7, 8),
    // middle
    (5, 9), (9, 10), (10, 11), (11, 12),
    // ring
    (9, 13), (13, 14), (14, 15), (15, 16),
    // pinky + palm base
    (13, 17), (17, 18), (18, 19), (19, 20), (0, 17),
];

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// A hand could not be built from the points supplied.
#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("expected 21 landmarks, got {0}")]
    WrongLandmarkCount(usize),

    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One anatomical point, normalized to the camera image: `x` and `y` in
/// `[0, 1]` from the top-left corner, `z` relative depth (wrist ≈ 0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Euclidean distance in the image plane; depth is ignored.
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

/// Which hand the detector believes it saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    #[serde(alias = "left")]
    Left,
    #[serde(alias = "right")]
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// The 21 landmarks of one hand in one processed video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Option<Handedness>,
    /// Detector confidence, 0.0–1.0.
    pub score: f32,
}

impl HandFrame {
    /// Build a hand from exactly [`LANDMARK_COUNT`] finite points.
    pub fn from_points(
        points: &[Landmark],
        handedness: Option<Handedness>,
        score: f32,
    ) -> Result<Self, FrameError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| FrameError::WrongLandmarkCount(points.len()))?;

        if let Some(bad) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(FrameError::NonFinite(bad));
        }

        Ok(HandFrame { landmarks, handedness, score })
    }

    pub fn landmarks(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.landmarks
    }

    /// Landmark at `i`; `None` past the end.
    pub fn landmark(&self, i: usize) -> Option<&Landmark> {
        self.landmarks.get(i)
    }

    pub fn index_tip(&self) -> &Landmark {
        &self.landmarks[index::INDEX_TIP]
    }

    pub fn thumb_tip(&self) -> &Landmark {
        &self.landmarks[index::THUMB_TIP]
    }

    /// Normalized 2D distance between thumb tip and index tip.
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance_2d(self.index_tip())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectionFrame
// ════════════════════════════════════════════════════════════════════════════

/// Everything the detector reported for one processed video frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionFrame {
    pub hands: Vec<HandFrame>,
    /// Detector-side timestamp, if it sends one.
    pub timestamp_ms: Option<u64>,
}

impl DetectionFrame {
    /// A frame in which no hand was found.
    pub fn empty() -> Self {
        DetectionFrame::default()
    }

    pub fn with_hand(hand: HandFrame) -> Self {
        DetectionFrame { hands: vec![hand], timestamp_ms: None }
    }

    /// The hand that drives the cursor: the first one reported.
    pub fn primary(&self) -> Option<&HandFrame> {
        self.hands.first()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }

    /// Drop hands whose detector score is below `min_score`.
    pub fn retain_confident(&mut self, min_score: f32) {
        self.hands.retain(|h| h.score >= min_score);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn open_hand() -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.3 + i as f32 * 0.01, 0.6 - i as f32 * 0.01, 0.0))
            .collect()
    }

    #[test]
    fn from_points_accepts_21() {
        let hand = HandFrame::from_points(&open_hand(), Some(Handedness::Right), 0.9).unwrap();
        assert_eq!(hand.landmarks().len(), LANDMARK_COUNT);
        assert_eq!(hand.index_tip(), &open_hand()[index::INDEX_TIP]);
    }

    #[test]
    fn handedness_reads_either_case() {
        let h: Handedness = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(h.as_str(), "Left");
        let h: Handedness = serde_json::from_str("\"Right\"").unwrap();
        assert_eq!(h.as_str(), "Right");
    }

    #[test]
    fn from_points_rejects_short_hand() {
        let pts = open_hand();
        assert_eq!(
            HandFrame::from_points(&pts[..20], None, 1.0),
            Err(FrameError::WrongLandmarkCount(20))
        );
    }

    #[test]
    fn from_points_rejects_nan() {
        let mut pts = open_hand();
        pts[7].y = f32::NAN;
        assert_eq!(HandFrame::from_points(&pts, None, 1.0), Err(FrameError::NonFinite(7)));
    }

    #[test]
    fn pinch_distance_ignores_depth() {
        let mut pts = open_hand();
        pts[index::THUMB_TIP] = Landmark::new(0.50, 0.50, -0.3);
        pts[index::INDEX_TIP] = Landmark::new(0.53, 0.54, 0.2);
        let hand = HandFrame::from_points(&pts, None, 1.0).unwrap();
        assert!((hand.pinch_distance() - 0.05).abs() < 1e-5);
    }

    #[test]
    fn retain_confident_filters() {
        let strong = HandFrame::from_points(&open_hand(), None, 0.9).unwrap();
        let weak = HandFrame::from_points(&open_hand(), None, 0.4).unwrap();
        let mut frame = DetectionFrame { hands: vec![weak, strong.clone()], timestamp_ms: None };
        frame.retain_confident(0.7);
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.primary(), Some(&strong));
    }

    #[test]
    fn connections_stay_in_range() {
        for (a, b) in HAND_CONNECTIONS {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
