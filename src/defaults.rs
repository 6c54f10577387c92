//! Default configuration constants for signsub.
//!
//! This module provides shared constants used across the classifier, the
//! detection backends and the subtitle assembler so that every threshold
//! has exactly one named definition.

/// Margin by which a fingertip must be farther from the wrist than its
/// proximal joint before the finger counts as "extended".
///
/// Distances are in normalized image-space units (the hand-pose source
/// reports all landmarks in [0,1] image coordinates).
pub const FINGER_EXTENDED_MARGIN: f32 = 0.1;

/// Maximum thumb-to-index tip distance for the closed "O" shape.
pub const LETTER_O_MAX_DIST: f32 = 0.03;

/// Minimum index-to-middle tip spread for the "V" shape (distinguishes it
/// from "U", which uses the same finger mask with the tips together).
pub const LETTER_V_MIN_DIST: f32 = 0.05;

/// Thumb-to-index tip distance window for the open "C" curve.
pub const LETTER_C_MIN_DIST: f32 = 0.05;
pub const LETTER_C_MAX_DIST: f32 = 0.15;

/// Maximum thumb-to-index pinch distance for the "F" shape.
pub const LETTER_F_MAX_PINCH: f32 = 0.05;

/// Minimum pinky-to-thumb spread for the "I Love You" sign.
pub const ILY_MIN_DIST: f32 = 0.15;

/// Maximum normalized index-tip height (y grows downward) for the raised
/// "Thank you" shape.
pub const THANK_YOU_MAX_TIP_Y: f32 = 0.3;

/// Confidence reported when no classification rule matches.
pub const UNKNOWN_CONFIDENCE: f32 = 0.3;

/// Number of per-frame observations kept in the smoothing window.
pub const SMOOTHING_WINDOW_SIZE: usize = 5;

/// Hard ceiling on smoothed confidence. Smoothed output never reports
/// near-certain confidence regardless of the per-frame values.
pub const SMOOTHED_CONFIDENCE_CEILING: f32 = 0.95;

/// Minimum confidence for a classification to become a sign event.
///
/// Enforced once, where backend output enters the sign event buffer.
pub const MIN_CONFIDENCE: f32 = 0.7;

/// Capacity of the rolling sign-event context buffer.
pub const EVENT_BUFFER_CAPACITY: usize = 10;

/// Capacity of the display history of sign events.
pub const DISPLAY_HISTORY_CAPACITY: usize = 200;

/// Number of raw sign events that triggers phrase synthesis.
pub const SENTENCE_MIN_SIGNS: usize = 3;

/// Silence duration in milliseconds before the in-progress subtitle text
/// is finalized into a subtitle entry.
pub const SILENCE_TIMEOUT_MS: u64 = 3000;

/// Maximum number of finalized subtitle entries retained (oldest dropped).
pub const SUBTITLE_HISTORY_CAPACITY: usize = 20;

/// Tick interval for the local-rules backend, in milliseconds.
///
/// Roughly frame-synchronized: ~30 ticks per second.
pub const LOCAL_RULES_TICK_MS: u64 = 33;

/// Tick interval for the remote-API backend, in milliseconds.
///
/// Deliberately slow to bound the request rate against the endpoint.
pub const REMOTE_TICK_MS: u64 = 1000;

/// Tick interval for the local-model backend, in milliseconds.
pub const LOCAL_MODEL_TICK_MS: u64 = 1000;

/// How long the same smoothed label must persist before it is re-emitted
/// as a fresh sign event.
pub const RECONFIRM_INTERVAL_MS: u64 = 2000;

/// Square input edge expected by the local classification model.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// Capture buffer dimensions requested from the frame source.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// Label list used when the model's metadata file fails to load.
pub const FALLBACK_LABELS: &[&str] = &[
    "hello",
    "how are you",
    "bye",
    "good",
    "thank you",
    "please",
    "yes",
    "no",
];
