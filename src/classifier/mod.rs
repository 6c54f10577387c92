//! Per-frame gesture classification from hand landmarks.
//!
//! `classify` is a pure function: it derives the finger state for one
//! frame and evaluates an ordered rule table, first match wins. Rules
//! carry fixed confidence constants; when nothing matches the observation
//! is `Unknown` with a low fixed confidence. Frames without a detected
//! hand never reach the classifier — backends produce a `NoHand`
//! observation instead.

pub mod rules;

use crate::defaults;
use crate::landmark::{FingerState, LandmarkFrame};
use std::fmt;

/// Label of a per-frame gesture observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    /// No hand was detected in the frame.
    NoHand,
    /// A hand was present but no rule matched.
    Unknown,
    /// A recognized sign label.
    Sign(String),
}

impl GestureLabel {
    /// Canonical string form of the label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoHand => "NoHand",
            Self::Unknown => "Unknown",
            Self::Sign(s) => s,
        }
    }

    /// True for labels that name an actual sign.
    pub fn is_sign(&self) -> bool {
        matches!(self, Self::Sign(_))
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One frame's classification result.
///
/// Lives only inside a single processing step.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureObservation {
    pub label: GestureLabel,
    pub confidence: f32,
    pub timestamp_ms: u64,
}

impl GestureObservation {
    /// Observation for a frame without a detected hand.
    pub fn no_hand(timestamp_ms: u64) -> Self {
        Self {
            label: GestureLabel::NoHand,
            confidence: 0.0,
            timestamp_ms,
        }
    }

    /// Observation for a hand that matched no rule.
    pub fn unknown(timestamp_ms: u64) -> Self {
        Self {
            label: GestureLabel::Unknown,
            confidence: defaults::UNKNOWN_CONFIDENCE,
            timestamp_ms,
        }
    }
}

/// Classifies one landmark frame into a gesture observation.
///
/// Evaluates [`rules::RULE_TABLE`] in declaration order; the first
/// matching rule wins and its fixed confidence is returned.
pub fn classify(frame: &LandmarkFrame) -> GestureObservation {
    let fingers = FingerState::from_frame(frame);

    for rule in rules::RULE_TABLE {
        if (rule.predicate)(&fingers, frame) {
            return GestureObservation {
                label: GestureLabel::Sign(rule.label.to_string()),
                confidence: rule.confidence,
                timestamp_ms: frame.timestamp_ms,
            };
        }
    }

    GestureObservation::unknown(frame.timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::index;
    use crate::landmark::test_support::*;

    fn frame_with_extended(tips: &[(usize, usize)]) -> LandmarkFrame {
        let mut frame = neutral_frame();
        // Spread the curled thumb and index tips apart (still within the
        // extension margin) so no pinch-distance rule fires by accident.
        set_point(&mut frame, index::THUMB_TIP, 0.42, 0.7);
        set_point(&mut frame, index::INDEX_TIP, 0.58, 0.7);
        for &(tip, pip) in tips {
            extend_finger(&mut frame, tip, pip);
        }
        frame
    }

    #[test]
    fn test_fist_is_letter_e() {
        let frame = frame_with_extended(&[]);
        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("E".to_string()));
        assert_eq!(obs.confidence, 0.84);
    }

    #[test]
    fn test_thumb_only_is_letter_a() {
        let frame = frame_with_extended(&[(index::THUMB_TIP, index::THUMB_IP)]);
        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("A".to_string()));
    }

    #[test]
    fn test_four_fingers_is_letter_b() {
        let frame = frame_with_extended(&[
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ]);
        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("B".to_string()));
    }

    #[test]
    fn test_all_fingers_is_hello() {
        let frame = frame_with_extended(&[
            (index::THUMB_TIP, index::THUMB_IP),
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ]);
        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("Hello".to_string()));
        assert_eq!(obs.confidence, 0.90);
    }

    #[test]
    fn test_raised_flat_hand_is_thank_you() {
        let mut frame = frame_with_extended(&[
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
            (index::RING_TIP, index::RING_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ]);
        // Same mask as "B" but with the fingertips high in the frame.
        set_point(&mut frame, index::INDEX_TIP, 0.45, 0.15);
        set_point(&mut frame, index::MIDDLE_TIP, 0.50, 0.14);
        set_point(&mut frame, index::RING_TIP, 0.55, 0.15);
        set_point(&mut frame, index::PINKY_TIP, 0.60, 0.17);

        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("Thank you".to_string()));
    }

    #[test]
    fn test_pinky_only_is_letter_i() {
        let frame = frame_with_extended(&[(index::PINKY_TIP, index::PINKY_PIP)]);
        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("I".to_string()));
    }

    #[test]
    fn test_index_and_middle_spread_is_letter_v() {
        let mut frame = frame_with_extended(&[
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
        ]);
        // Spread the two tips well past LETTER_V_MIN_DIST.
        set_point(&mut frame, index::INDEX_TIP, 0.35, 0.32);
        set_point(&mut frame, index::MIDDLE_TIP, 0.65, 0.32);

        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("V".to_string()));
    }

    #[test]
    fn test_index_and_middle_together_is_no() {
        let mut frame = frame_with_extended(&[
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::MIDDLE_TIP, index::MIDDLE_PIP),
        ]);
        // Tips touching: the "No" shape, ordered before U/V.
        set_point(&mut frame, index::INDEX_TIP, 0.50, 0.32);
        set_point(&mut frame, index::MIDDLE_TIP, 0.51, 0.32);

        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("No".to_string()));
    }

    #[test]
    fn test_i_love_you_beats_letter_y() {
        let mut frame = frame_with_extended(&[
            (index::THUMB_TIP, index::THUMB_IP),
            (index::INDEX_TIP, index::INDEX_PIP),
            (index::PINKY_TIP, index::PINKY_PIP),
        ]);
        set_point(&mut frame, index::THUMB_TIP, 0.1, 0.32);
        set_point(&mut frame, index::PINKY_TIP, 0.9, 0.32);

        let obs = classify(&frame);
        assert_eq!(obs.label, GestureLabel::Sign("I Love You".to_string()));
        assert_eq!(obs.confidence, 0.92);
    }

    #[test]
    fn test_no_hand_observation_constructor() {
        let obs = GestureObservation::no_hand(123);
        assert_eq!(obs.label, GestureLabel::NoHand);
        assert_eq!(obs.confidence, 0.0);
        assert_eq!(obs.timestamp_ms, 123);
    }

    #[test]
    fn test_unknown_observation_confidence() {
        let obs = GestureObservation::unknown(5);
        assert_eq!(obs.label, GestureLabel::Unknown);
        assert_eq!(obs.confidence, defaults::UNKNOWN_CONFIDENCE);
    }

    #[test]
    fn test_label_as_str() {
        assert_eq!(GestureLabel::NoHand.as_str(), "NoHand");
        assert_eq!(GestureLabel::Unknown.as_str(), "Unknown");
        assert_eq!(GestureLabel::Sign("Hello".to_string()).as_str(), "Hello");
        assert!(GestureLabel::Sign("A".to_string()).is_sign());
        assert!(!GestureLabel::Unknown.is_sign());
    }
}
