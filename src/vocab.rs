//! Word-level sign vocabulary, categories, and display translations.
//!
//! The vocabulary filters remote classification output down to known
//! sign words and assigns each word a coarse category for downstream
//! context. Translations cover the small set of signs the rule-based
//! classifier can emit.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Subtitle display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    Khmer,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::English => "english",
            Self::Spanish => "spanish",
            Self::Khmer => "khmer",
        };
        f.write_str(name)
    }
}

const WORD_LIST: &[&str] = &[
    // Basic greetings and common phrases
    "hello", "goodbye", "please", "thank you", "sorry", "excuse me",
    "yes", "no", "maybe", "help", "stop", "go", "come", "wait",
    // Family and people
    "family", "mother", "father", "sister", "brother", "child", "baby",
    "friend", "person", "man", "woman", "boy", "girl",
    // Common verbs
    "eat", "drink", "sleep", "work", "play", "read", "write", "walk",
    "run", "sit", "stand", "look", "see", "hear", "speak", "think",
    "know", "understand", "learn", "teach", "give", "take", "buy", "sell",
    // Emotions and feelings
    "happy", "sad", "angry", "excited", "tired", "sick", "good", "bad",
    "love", "like", "hate", "want", "need", "feel", "hurt", "pain",
    // Time
    "time", "today", "tomorrow", "yesterday", "morning", "afternoon",
    "evening", "night", "week", "month", "year", "now", "later", "before",
    // Places
    "home", "school", "hospital", "store", "restaurant",
    "bathroom", "kitchen", "bedroom", "car", "bus", "train",
    // Food and drinks
    "food", "water", "milk", "coffee", "tea", "bread", "meat", "fish",
    "fruit", "vegetable", "apple", "banana", "pizza", "hamburger",
    // Colors
    "red", "blue", "green", "yellow", "black", "white", "brown", "pink",
    // Numbers
    "one", "two", "three", "four", "five", "six", "seven", "eight",
    "nine", "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen",
    "sixteen", "seventeen", "eighteen", "nineteen", "twenty",
    // Question words
    "what", "where", "when", "who", "why", "how", "which",
    // Common adjectives
    "big", "small", "hot", "cold", "new", "old", "fast", "slow",
    "easy", "hard", "right", "wrong", "same", "different",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("greetings", &["hello", "goodbye", "please", "thank you", "sorry", "excuse me"]),
    ("responses", &["yes", "no", "maybe"]),
    ("actions", &["help", "stop", "go", "come", "wait", "eat", "drink", "sleep"]),
    ("family", &["family", "mother", "father", "sister", "brother", "child"]),
    ("emotions", &["happy", "sad", "angry", "excited", "tired", "love", "like"]),
    ("time", &["today", "tomorrow", "yesterday", "morning", "afternoon", "now"]),
    ("places", &["home", "school", "work", "hospital", "store", "restaurant"]),
    ("colors", &["red", "blue", "green", "yellow", "black", "white"]),
    ("numbers", &["one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"]),
];

const TRANSLATED_SIGNS: &[(&str, &str, &str)] = &[
    // (english, spanish, khmer), keyed by the canonical english form.
    ("Hello", "Hola", "សួស្តី"),
    ("Thank you", "Gracias", "អរគុណ"),
    ("Please", "Por favor", "សូម"),
    ("Sorry", "Lo siento", "សុំទោស"),
    ("Yes", "Sí", "បាទ"),
    ("No", "No", "ទេ"),
    ("Help", "Ayuda", "ជួយ"),
    ("Good", "Bueno", "ល្អ"),
    ("Bad", "Malo", "មិនល្អ"),
    ("Happy", "Feliz", "រីករាយ"),
    ("Sad", "Triste", "ព្រួយ"),
    ("Love", "Amor", "ស្រលាញ់"),
    ("Family", "Familia", "គ្រួសារ"),
    ("Work", "Trabajo", "ការងារ"),
    ("Home", "Casa", "ផ្ទះ"),
];

/// Vocabulary statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VocabStats {
    pub words: usize,
    pub categories: usize,
    pub translated_signs: usize,
}

/// Immutable word-level vocabulary, built once at pipeline startup.
#[derive(Debug)]
pub struct Vocabulary {
    words: Vec<&'static str>,
    categories: HashMap<&'static str, &'static str>,
    translations: HashMap<&'static str, [&'static str; 3]>,
}

impl Vocabulary {
    pub fn new() -> Self {
        let mut categories = HashMap::new();
        for (category, words) in CATEGORIES {
            for word in *words {
                categories.insert(*word, *category);
            }
        }
        let mut translations = HashMap::new();
        for (english, spanish, khmer) in TRANSLATED_SIGNS {
            translations.insert(*english, [*english, *spanish, *khmer]);
        }
        Self {
            words: WORD_LIST.to_vec(),
            categories,
            translations,
        }
    }

    /// Normalizes a raw model label to vocabulary form: lowercase, letters
    /// and spaces only, first word when several.
    pub fn normalize_label(label: &str) -> String {
        let cleaned: String = label
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || *c == ' ')
            .collect();
        cleaned
            .trim()
            .split(' ')
            .next()
            .unwrap_or("")
            .to_string()
    }

    /// True when a normalized word is part of the vocabulary.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word)
    }

    /// Category of a vocabulary word, `"general"` when uncategorized.
    pub fn category_of(&self, word: &str) -> &'static str {
        self.categories.get(word).copied().unwrap_or("general")
    }

    /// Display translation of a canonical sign.
    ///
    /// Falls back to the canonical form for signs without a translation
    /// in the requested language.
    pub fn translate<'a>(&self, sign: &'a str, language: Language) -> &'a str {
        let Some(forms) = self.translations.get(sign) else {
            return sign;
        };
        match language {
            Language::English => forms[0],
            Language::Spanish => forms[1],
            Language::Khmer => forms[2],
        }
    }

    /// Word list, in declaration order.
    pub fn words(&self) -> &[&'static str] {
        &self.words
    }

    pub fn stats(&self) -> VocabStats {
        VocabStats {
            words: self.words.len(),
            categories: CATEGORIES.len(),
            translated_signs: self.translations.len(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
