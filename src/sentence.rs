//! Phrase synthesis from a run of raw sign events.
//!
//! A handful of pattern rules map common word combinations onto natural
//! phrases; anything unmatched falls back to capitalized word joining.
//! The synthesized event carries the mean confidence of its inputs and
//! records the raw signs it was built from.

use crate::event::SignEvent;

const EMOTIONS: &[&str] = &["happy", "sad", "angry", "excited", "tired"];
const FAMILY: &[&str] = &["mother", "father", "sister", "brother", "family"];
const ACTIONS: &[&str] = &["eat", "drink", "sleep", "work", "play"];

/// Builds a natural phrase from detected sign words.
///
/// Pattern rules are checked in order of specificity; the first match
/// wins. Returns an empty string for an empty input.
pub fn convert_to_sentence(words: &[&str]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let has = |w: &str| lower.iter().any(|x| x == w);

    if has("hello") {
        return "Hello!".to_string();
    }
    if (has("thank") && has("you")) || has("thank you") {
        return "Thank you.".to_string();
    }
    if has("please") {
        return "Please help me.".to_string();
    }
    if has("sorry") {
        return "I am sorry.".to_string();
    }
    if has("yes") {
        return "Yes.".to_string();
    }
    if has("no") {
        return "No.".to_string();
    }
    if has("help") {
        return "I need help.".to_string();
    }
    if has("good") {
        return "That is good.".to_string();
    }
    if has("bad") {
        return "That is bad.".to_string();
    }

    if let Some(emotion) = lower.iter().find(|w| EMOTIONS.contains(&w.as_str())) {
        return format!("I am {emotion}.");
    }
    if let Some(member) = lower.iter().find(|w| FAMILY.contains(&w.as_str())) {
        return format!("This is my {member}.");
    }
    if let Some(action) = lower.iter().find(|w| ACTIONS.contains(&w.as_str())) {
        return format!("I want to {action}.");
    }

    format!("{}.", capitalize_first(&lower.join(" ")))
}

/// Synthesizes a sentence event from a run of raw sign events.
///
/// Returns `None` when the input is empty or the pattern rules produce
/// nothing. The event's confidence is the arithmetic mean of the inputs
/// and its timestamp is taken from the last input.
pub fn synthesize_sentence(id: u64, events: &[SignEvent]) -> Option<SignEvent> {
    let last = events.last()?;
    let words: Vec<&str> = events.iter().map(|e| e.sign.as_str()).collect();
    let text = convert_to_sentence(&words);
    if text.is_empty() {
        return None;
    }

    let mean = events.iter().map(|e| e.confidence).sum::<f32>() / events.len() as f32;
    Some(SignEvent {
        id,
        sign: text,
        confidence: mean,
        timestamp_ms: last.timestamp_ms,
        category: None,
        is_sentence: true,
        original_signs: Some(words.iter().map(|w| w.to_string()).collect()),
    })
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
