//! Hand landmark frames and derived finger state.
//!
//! A hand-pose source reports 21 tracked points per hand in normalized
//! [0,1] image coordinates. This module names the points the classifier
//! cares about and derives the per-finger extended/curled state.

use crate::defaults;

/// Number of tracked points per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices for key hand positions.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_PIP: usize = 14;
    pub const RING_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// One hand's landmarks for a single captured frame.
///
/// Immutable once captured; discarded after classification.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// 21 points, normalized [0,1] image space, ordered by landmark index.
    pub points: [[f32; 3]; LANDMARK_COUNT],
    /// Capture timestamp in epoch milliseconds.
    pub timestamp_ms: u64,
}

impl LandmarkFrame {
    /// Creates a frame from raw points and a capture timestamp.
    pub fn new(points: [[f32; 3]; LANDMARK_COUNT], timestamp_ms: u64) -> Self {
        Self {
            points,
            timestamp_ms,
        }
    }

    /// Returns the point at a named landmark index.
    pub fn point(&self, idx: usize) -> [f32; 3] {
        self.points[idx]
    }

    /// Distance between two landmarks of this frame.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        point_distance(&self.points[a], &self.points[b])
    }
}

/// Euclidean distance between two landmarks in the image plane.
///
/// The depth coordinate is ignored: the pose source's z estimate is far
/// noisier than x/y and the shape rules are tuned for planar distances.
pub fn point_distance(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Per-finger extended state derived from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FingerState {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerState {
    /// Derives the finger state for one frame.
    ///
    /// A finger counts as extended when its tip is farther from the wrist
    /// than its proximal joint by [`defaults::FINGER_EXTENDED_MARGIN`].
    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        Self {
            thumb: is_extended(frame, index::THUMB_TIP, index::THUMB_IP),
            index: is_extended(frame, index::INDEX_TIP, index::INDEX_PIP),
            middle: is_extended(frame, index::MIDDLE_TIP, index::MIDDLE_PIP),
            ring: is_extended(frame, index::RING_TIP, index::RING_PIP),
            pinky: is_extended(frame, index::PINKY_TIP, index::PINKY_PIP),
        }
    }

    /// Number of extended fingers.
    pub fn extended_count(&self) -> usize {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&b| b)
            .count()
    }

    /// True when no finger is extended (closed fist).
    pub fn is_fist(&self) -> bool {
        self.extended_count() == 0
    }
}

fn is_extended(frame: &LandmarkFrame, tip: usize, pip: usize) -> bool {
    let tip_to_wrist = frame.distance(tip, index::WRIST);
    let pip_to_wrist = frame.distance(pip, index::WRIST);
    tip_to_wrist > pip_to_wrist + defaults::FINGER_EXTENDED_MARGIN
}
