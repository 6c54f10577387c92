//! Temporal smoothing of per-frame gesture observations.
//!
//! Single-frame classification is noisy (hand jitter, transient
//! occlusion). The window keeps a short FIFO of recent observations and
//! votes by count-weighted average confidence, so a label that is both
//! frequent and individually confident beats one that is merely frequent.

use crate::classifier::{GestureLabel, GestureObservation};
use crate::defaults;
use std::collections::HashMap;
use std::collections::VecDeque;

/// Stabilized gesture estimate over a trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedGesture {
    pub label: GestureLabel,
    pub confidence: f32,
    pub timestamp_ms: u64,
}

/// Fixed-capacity FIFO of recent observations with majority-vote readout.
#[derive(Debug)]
pub struct SmoothingWindow {
    capacity: usize,
    history: VecDeque<GestureObservation>,
}

impl SmoothingWindow {
    /// Creates a window with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(defaults::SMOOTHING_WINDOW_SIZE)
    }

    /// Creates a window holding at most `capacity` observations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Pushes one observation and returns the current smoothed estimate.
    ///
    /// On overflow the oldest observation is discarded.
    pub fn push(&mut self, observation: GestureObservation) -> SmoothedGesture {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(observation);
        self.current()
    }

    /// Returns the smoothed estimate for the buffered observations.
    ///
    /// Score per label = count × mean confidence; highest score wins.
    /// The returned confidence is the winning label's mean confidence,
    /// capped at [`defaults::SMOOTHED_CONFIDENCE_CEILING`].
    pub fn current(&self) -> SmoothedGesture {
        let Some(last) = self.history.back() else {
            return SmoothedGesture {
                label: GestureLabel::Unknown,
                confidence: 0.0,
                timestamp_ms: 0,
            };
        };

        let mut tallies: HashMap<&GestureLabel, (usize, f32)> = HashMap::new();
        for obs in &self.history {
            let entry = tallies.entry(&obs.label).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += obs.confidence;
        }

        let mut best: Option<(&GestureLabel, f32, f32)> = None;
        for (label, (count, sum)) in &tallies {
            let avg = sum / *count as f32;
            let score = *count as f32 * avg;
            match best {
                Some((_, best_score, _)) if score <= best_score => {}
                _ => best = Some((label, score, avg)),
            }
        }

        match best {
            Some((label, _, avg)) => SmoothedGesture {
                label: label.clone(),
                confidence: avg.min(defaults::SMOOTHED_CONFIDENCE_CEILING),
                timestamp_ms: last.timestamp_ms,
            },
            // tallies is non-empty here, but fall back rather than panic
            None => SmoothedGesture {
                label: GestureLabel::Unknown,
                confidence: 0.0,
                timestamp_ms: last.timestamp_ms,
            },
        }
    }

    /// Number of buffered observations.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True when no observations are buffered.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Discards all buffered observations.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new()
    }
}
