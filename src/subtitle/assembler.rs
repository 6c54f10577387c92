//! Builds subtitle lines from recognized signs.
//!
//! Accepted sign texts accumulate into an in-progress line; a stretch of
//! silence finalizes the line into a timed entry. The assembler is
//! synchronous and takes explicit timestamps, so the silence behavior is
//! testable without sleeping; the pipeline supplies wall-clock pacing.

use crate::defaults;
use crate::event::SubtitleEntry;
use std::collections::VecDeque;

/// Accumulates sign texts into timed subtitle entries.
#[derive(Debug)]
pub struct SubtitleAssembler {
    silence_timeout_ms: u64,
    history_capacity: usize,
    current: Vec<String>,
    current_confidence: f32,
    last_sign: Option<String>,
    last_activity_ms: Option<u64>,
    history: VecDeque<SubtitleEntry>,
    next_id: u64,
}

impl SubtitleAssembler {
    /// Creates an assembler with the default timeout and history size.
    pub fn new() -> Self {
        Self::with_limits(
            defaults::SILENCE_TIMEOUT_MS,
            defaults::SUBTITLE_HISTORY_CAPACITY,
        )
    }

    /// Creates an assembler with explicit timeout and history capacity.
    pub fn with_limits(silence_timeout_ms: u64, history_capacity: usize) -> Self {
        Self {
            silence_timeout_ms,
            history_capacity,
            current: Vec::new(),
            current_confidence: 0.0,
            last_sign: None,
            last_activity_ms: None,
            history: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Offers a sign text to the in-progress line.
    ///
    /// Returns false when the text is dropped as a consecutive repeat of
    /// the last accepted sign. Repeats of an earlier, non-adjacent sign
    /// are accepted.
    pub fn accept(&mut self, text: &str, confidence: f32, now_ms: u64) -> bool {
        if self.last_sign.as_deref() == Some(text) {
            // Still the same held sign; keep the silence clock running.
            return false;
        }
        self.current.push(text.to_string());
        self.current_confidence = confidence;
        self.last_sign = Some(text.to_string());
        self.last_activity_ms = Some(now_ms);
        true
    }

    /// Finalizes the in-progress line into a subtitle entry.
    ///
    /// Returns `None` when nothing has accumulated. The entry spans the
    /// silence window that closed it. Oldest entries are evicted past
    /// the history capacity.
    pub fn finalize(&mut self, now_ms: u64) -> Option<SubtitleEntry> {
        if self.current.is_empty() {
            return None;
        }
        let entry = SubtitleEntry {
            id: self.next_id,
            text: self.current.join(" "),
            start_ms: now_ms.saturating_sub(self.silence_timeout_ms),
            end_ms: now_ms,
            confidence: self.current_confidence,
        };
        self.next_id += 1;
        self.current.clear();
        self.last_activity_ms = None;

        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(entry.clone());
        Some(entry)
    }

    /// True when a line is accumulating.
    pub fn has_pending(&self) -> bool {
        !self.current.is_empty()
    }

    /// The in-progress line, for live display.
    pub fn pending_text(&self) -> String {
        self.current.join(" ")
    }

    /// Deadline at which the in-progress line should be finalized.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.last_activity_ms
            .map(|ms| ms + self.silence_timeout_ms)
    }

    /// Finalized entries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &SubtitleEntry> {
        self.history.iter()
    }

    /// Drops the in-progress line and all history.
    pub fn clear(&mut self) {
        self.current.clear();
        self.last_sign = None;
        self.last_activity_ms = None;
        self.history.clear();
    }
}

impl Default for SubtitleAssembler {
    fn default() -> Self {
        Self::new()
    }
}
