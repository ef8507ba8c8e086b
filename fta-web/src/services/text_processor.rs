//! Text cleaning and tokenization
//!
//! `clean_text` is the normalization every downstream stage sees: control
//! characters dropped, NFC-composed, whitespace runs collapsed to one space,
//! trimmed. It is idempotent and total over `&str`.

use serde::Serialize;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Common English function words removed by `preprocess_text(.., true)`
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Tokens after preprocessing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedText {
    pub tokens: Vec<String>,
    pub stopwords_removed: bool,
}

impl ProcessedText {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Text preprocessor
///
/// Holds the stopword table so lookups stay O(1) per token.
#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    stopwords: HashSet<&'static str>,
}

impl TextPreprocessor {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }

    /// Normalize raw input text
    ///
    /// **Algorithm:**
    /// 1. Drop control characters that are not whitespace, and the BOM
    /// 2. Unicode NFC normalization
    /// 3. Collapse each whitespace run to a single space, trim both ends
    ///
    /// Controls are removed before composition so that a removed control
    /// cannot expose a composable pair on a second pass.
    pub fn clean_text(&self, raw: &str) -> String {
        let visible: String = raw
            .chars()
            .filter(|c| !is_noise_char(*c))
            .collect();

        let composed: String = visible.nfc().collect();

        composed.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Tokenize text, optionally removing stopwords
    ///
    /// Tokens are lowercased and stripped of leading/trailing punctuation
    /// (`"Revenue,"` → `"revenue"`, `"$4.2B"` → `"4.2b"`). Tokens made only of
    /// punctuation disappear.
    pub fn preprocess_text(&self, raw: &str, remove_stopwords: bool) -> ProcessedText {
        let cleaned = self.clean_text(raw).to_lowercase();

        let tokens = cleaned
            .split(' ')
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| !token.is_empty())
            .filter(|token| !remove_stopwords || !self.is_stopword(token))
            .map(str::to_string)
            .collect();

        ProcessedText {
            tokens,
            stopwords_removed: remove_stopwords,
        }
    }

    /// Whether a lowercase token is in the stopword table
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_noise_char(c: char) -> bool {
    (c.is_control() && !c.is_whitespace()) || c == '\u{feff}'
}
