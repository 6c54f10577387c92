//! Rolling sign-event context buffer.
//!
//! Backends emit raw sign events faster than they are useful for phrase
//! synthesis. The buffer keeps a short bounded FIFO of the most recent
//! events and signals when enough have accumulated to attempt a sentence.

use crate::defaults;
use crate::event::SignEvent;
use std::collections::VecDeque;

/// Bounded FIFO of recent sign events.
#[derive(Debug)]
pub struct SignEventBuffer {
    capacity: usize,
    min_signs: usize,
    events: VecDeque<SignEvent>,
}

impl SignEventBuffer {
    /// Creates a buffer with the default capacity and synthesis threshold.
    pub fn new() -> Self {
        Self::with_limits(defaults::EVENT_BUFFER_CAPACITY, defaults::SENTENCE_MIN_SIGNS)
    }

    /// Creates a buffer with explicit capacity and synthesis threshold.
    pub fn with_limits(capacity: usize, min_signs: usize) -> Self {
        Self {
            capacity,
            min_signs,
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends an event, evicting the oldest when at capacity.
    pub fn push(&mut self, event: SignEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// True when enough events have accumulated for phrase synthesis.
    pub fn is_sentence_ready(&self) -> bool {
        self.events.len() >= self.min_signs
    }

    /// Returns up to the `n` most recent events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<&SignEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).collect()
    }

    /// Removes and returns all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<SignEvent> {
        self.events.drain(..).collect()
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all buffered events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for SignEventBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64, sign: &str) -> SignEvent {
        SignEvent::new(id, sign, 0.9, id * 100)
    }

    #[test]
    fn test_push_and_len() {
        let mut buffer = SignEventBuffer::new();
        assert!(buffer.is_empty());
        buffer.push(event(1, "Hello"));
        buffer.push(event(2, "Yes"));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = SignEventBuffer::with_limits(3, 3);
        for i in 1..=5 {
            buffer.push(event(i, "A"));
        }
        assert_eq!(buffer.len(), 3);
        let ids: Vec<u64> = buffer.recent(10).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_sentence_readiness_threshold() {
        let mut buffer = SignEventBuffer::with_limits(10, 3);
        buffer.push(event(1, "Hello"));
        buffer.push(event(2, "Thank you"));
        assert!(!buffer.is_sentence_ready());
        buffer.push(event(3, "Yes"));
        assert!(buffer.is_sentence_ready());
    }

    #[test]
    fn test_recent_returns_newest_in_order() {
        let mut buffer = SignEventBuffer::new();
        for i in 1..=5 {
            buffer.push(event(i, "A"));
        }
        let ids: Vec<u64> = buffer.recent(2).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_drain_empties_buffer() {
        let mut buffer = SignEventBuffer::new();
        buffer.push(event(1, "Hello"));
        buffer.push(event(2, "Yes"));
        let drained = buffer.drain();
        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
        assert!(!buffer.is_sentence_ready());
    }

    #[test]
    fn test_clear() {
        let mut buffer = SignEventBuffer::new();
        buffer.push(event(1, "Hello"));
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
