//! Ordered gesture rule table.
//!
//! Each rule is a `(label, confidence, predicate)` tuple over the derived
//! finger state and raw landmark distances. Rules are evaluated top to
//! bottom and the FIRST match wins, so more specific shapes must appear
//! before the general masks they overlap with: the word shapes that share
//! a finger mask with a letter come first, and "V" (spread tips) comes
//! before "U" (same mask, tips together).
//!
//! Some plausible signs are deliberately absent: "Please" and "Yes" would
//! repeat the "Hello" and "A" predicates exactly (and so could never
//! match), "L" would repeat "D", and "H" would repeat "U". "How are you?"
//! needs cross-frame motion state and has no place in a pure per-frame
//! classifier.

use crate::defaults;
use crate::landmark::{FingerState, LandmarkFrame, index};

/// A single classification rule.
pub struct GestureRule {
    /// Canonical sign label emitted on match.
    pub label: &'static str,
    /// Fixed confidence reported for this rule.
    pub confidence: f32,
    /// Shape predicate over finger state and raw landmarks.
    pub predicate: fn(&FingerState, &LandmarkFrame) -> bool,
}

/// The rule table, evaluated in declaration order.
pub const RULE_TABLE: &[GestureRule] = &[
    // Word shapes before the letter masks they collide with.
    GestureRule {
        label: "I Love You",
        confidence: 0.92,
        predicate: is_i_love_you,
    },
    GestureRule {
        label: "Thank you",
        confidence: 0.88,
        predicate: is_thank_you,
    },
    GestureRule {
        label: "Hello",
        confidence: 0.90,
        predicate: is_hello,
    },
    GestureRule {
        label: "No",
        confidence: 0.86,
        predicate: is_no,
    },
    // ASL letters.
    GestureRule {
        label: "A",
        confidence: 0.85,
        predicate: is_letter_a,
    },
    GestureRule {
        label: "B",
        confidence: 0.88,
        predicate: is_letter_b,
    },
    GestureRule {
        label: "C",
        confidence: 0.82,
        predicate: is_letter_c,
    },
    GestureRule {
        label: "D",
        confidence: 0.86,
        predicate: is_letter_d,
    },
    GestureRule {
        label: "E",
        confidence: 0.84,
        predicate: is_letter_e,
    },
    GestureRule {
        label: "F",
        confidence: 0.87,
        predicate: is_letter_f,
    },
    GestureRule {
        label: "G",
        confidence: 0.83,
        predicate: is_letter_g,
    },
    GestureRule {
        label: "I",
        confidence: 0.89,
        predicate: is_letter_i,
    },
    GestureRule {
        label: "O",
        confidence: 0.85,
        predicate: is_letter_o,
    },
    GestureRule {
        label: "V",
        confidence: 0.88,
        predicate: is_letter_v,
    },
    GestureRule {
        label: "U",
        confidence: 0.86,
        predicate: is_letter_u,
    },
    GestureRule {
        label: "W",
        confidence: 0.84,
        predicate: is_letter_w,
    },
    GestureRule {
        label: "Y",
        confidence: 0.87,
        predicate: is_letter_y,
    },
];

fn thumb_index_dist(frame: &LandmarkFrame) -> f32 {
    frame.distance(index::THUMB_TIP, index::INDEX_TIP)
}

fn is_i_love_you(f: &FingerState, frame: &LandmarkFrame) -> bool {
    let pinky_thumb = frame.distance(index::PINKY_TIP, index::THUMB_TIP);
    f.pinky && f.index && !f.middle && !f.ring && f.thumb && pinky_thumb > defaults::ILY_MIN_DIST
}

fn is_thank_you(f: &FingerState, frame: &LandmarkFrame) -> bool {
    // Flat hand raised high in the frame (y grows downward).
    let tip_y = frame.point(index::INDEX_TIP)[1];
    f.index && f.middle && f.ring && f.pinky && !f.thumb && tip_y < defaults::THANK_YOU_MAX_TIP_Y
}

fn is_hello(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && f.middle && f.ring && f.pinky && f.thumb
}

fn is_no(f: &FingerState, frame: &LandmarkFrame) -> bool {
    let spread = frame.distance(index::INDEX_TIP, index::MIDDLE_TIP);
    f.index && f.middle && !f.ring && !f.pinky && spread < defaults::LETTER_O_MAX_DIST
}

fn is_letter_a(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    !f.index && !f.middle && !f.ring && !f.pinky && f.thumb
}

fn is_letter_b(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && f.middle && f.ring && f.pinky && !f.thumb
}

fn is_letter_c(_f: &FingerState, frame: &LandmarkFrame) -> bool {
    let d = thumb_index_dist(frame);
    d > defaults::LETTER_C_MIN_DIST && d < defaults::LETTER_C_MAX_DIST
}

fn is_letter_d(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && !f.middle && !f.ring && !f.pinky && f.thumb
}

fn is_letter_e(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.is_fist()
}

fn is_letter_f(f: &FingerState, frame: &LandmarkFrame) -> bool {
    thumb_index_dist(frame) < defaults::LETTER_F_MAX_PINCH && f.middle && f.ring && f.pinky
}

fn is_letter_g(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && !f.middle && !f.ring && !f.pinky && !f.thumb
}

fn is_letter_i(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    !f.index && !f.middle && !f.ring && f.pinky && !f.thumb
}

fn is_letter_o(_f: &FingerState, frame: &LandmarkFrame) -> bool {
    thumb_index_dist(frame) < defaults::LETTER_O_MAX_DIST
}

fn is_letter_v(f: &FingerState, frame: &LandmarkFrame) -> bool {
    let spread = frame.distance(index::INDEX_TIP, index::MIDDLE_TIP);
    f.index && f.middle && !f.ring && !f.pinky && spread > defaults::LETTER_V_MIN_DIST
}

fn is_letter_u(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && f.middle && !f.ring && !f.pinky && !f.thumb
}

fn is_letter_w(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    f.index && f.middle && f.ring && !f.pinky && !f.thumb
}

fn is_letter_y(f: &FingerState, _frame: &LandmarkFrame) -> bool {
    !f.index && !f.middle && !f.ring && f.pinky && f.thumb
}
