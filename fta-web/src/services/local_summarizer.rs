//! Offline extractive summarizer
//!
//! Used in place of the AI service when it is unavailable. Sentences are
//! scored by the normalized frequency of their content words; the best ones
//! form the summary (in reading order) and the key points (in score order).

use std::collections::HashMap;

use crate::services::llm_handler::Insight;
use crate::services::text_processor::TextPreprocessor;

/// Sentences kept in a local summary
pub const SUMMARY_SENTENCES: usize = 3;

/// Key points returned by [`LocalSummarizer::key_points`]
pub const KEY_POINTS: usize = 5;

struct ScoredSentence<'a> {
    index: usize,
    text: &'a str,
    score: f64,
    top_term: Option<String>,
}

/// Frequency-based extractive summarizer
#[derive(Debug, Clone, Default)]
pub struct LocalSummarizer {
    preprocessor: TextPreprocessor,
}

impl LocalSummarizer {
    pub fn new() -> Self {
        Self {
            preprocessor: TextPreprocessor::new(),
        }
    }

    /// Top sentences joined in original order, `None` for text without words
    pub fn summarize(&self, text: &str) -> Option<String> {
        let mut scored = self.score_sentences(text);
        if scored.is_empty() {
            return None;
        }

        rank(&mut scored);
        scored.truncate(SUMMARY_SENTENCES);
        scored.sort_by_key(|s| s.index);

        Some(
            scored
                .iter()
                .map(|s| s.text)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Highest scoring sentences as topic/detail pairs
    ///
    /// The topic is the sentence's most frequent content word, title-cased.
    pub fn key_points(&self, text: &str) -> Vec<Insight> {
        let mut scored = self.score_sentences(text);
        rank(&mut scored);
        scored.truncate(KEY_POINTS);

        scored
            .into_iter()
            .map(|s| Insight {
                topic: s
                    .top_term
                    .as_deref()
                    .map(title_case)
                    .unwrap_or_else(|| format!("Point {}", s.index + 1)),
                detail: s.text.to_string(),
            })
            .collect()
    }

    fn score_sentences<'a>(&self, text: &'a str) -> Vec<ScoredSentence<'a>> {
        let sentences = split_sentences(text);

        let tokenized: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| self.preprocessor.preprocess_text(s, true).tokens)
            .collect();

        let mut frequencies: HashMap<&str, usize> = HashMap::new();
        for token in tokenized.iter().flatten() {
            if is_content_word(token) {
                *frequencies.entry(token.as_str()).or_insert(0) += 1;
            }
        }
        let max_frequency = frequencies.values().copied().max().unwrap_or(0);
        if max_frequency == 0 {
            return Vec::new();
        }

        sentences
            .into_iter()
            .zip(tokenized.iter())
            .enumerate()
            .filter_map(|(index, (sentence, tokens))| {
                let content: Vec<&str> = tokens
                    .iter()
                    .map(String::as_str)
                    .filter(|t| is_content_word(t))
                    .collect();
                if content.is_empty() {
                    return None;
                }

                let weight = |t: &str| {
                    frequencies.get(t).copied().unwrap_or(0) as f64 / max_frequency as f64
                };
                let total: f64 = content.iter().map(|&t| weight(t)).sum();
                let score = total / (content.len() as f64).sqrt();

                // Earliest of the heaviest terms, deterministic on ties
                let mut top_term: Option<(&str, f64)> = None;
                for &t in &content {
                    let w = weight(t);
                    if top_term.map_or(true, |(_, best)| w > best) {
                        top_term = Some((t, w));
                    }
                }

                Some(ScoredSentence {
                    index,
                    text: sentence,
                    score,
                    top_term: top_term.map(|(t, _)| t.to_string()),
                })
            })
            .collect()
    }
}

/// Sort by score descending, earlier sentences first on ties
fn rank(scored: &mut [ScoredSentence<'_>]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
}

/// Split on `.`, `!` or `?` followed by whitespace or end of text
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = idx + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

/// Words with at least one letter and more than two characters
fn is_content_word(token: &str) -> bool {
    token.chars().count() > 2 && token.chars().any(char::is_alphabetic)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
