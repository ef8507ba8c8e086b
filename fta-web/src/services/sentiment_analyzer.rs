//! Lexicon-based sentiment scoring
//!
//! Wraps the VADER (Valence Aware Dictionary and sEntiment Reasoner) lexicon.
//! Scoring is deterministic and offline: the same text always yields the same
//! [`SentimentResult`].

use serde::{Deserialize, Serialize};
use std::fmt;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Compound score at or above which text is labelled positive
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Compound score at or below which text is labelled negative
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

const POSITIVE_COLOR: &str = "#10b981";
const NEUTRAL_COLOR: &str = "#9ca3af";
const NEGATIVE_COLOR: &str = "#ef4444";

/// Overall polarity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment scores for one text
///
/// `pos + neg + neu == 1` and `compound ∈ [-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: SentimentLabel,
    pub compound: f64,
    pub pos: f64,
    pub neg: f64,
    pub neu: f64,
}

impl SentimentResult {
    /// Neutral result used when the text carries no scorable content
    pub fn neutral() -> Self {
        Self {
            sentiment: SentimentLabel::Neutral,
            compound: 0.0,
            pos: 0.0,
            neg: 0.0,
            neu: 1.0,
        }
    }

    /// Largest of the three proportions
    pub fn confidence(&self) -> f64 {
        self.pos.max(self.neg).max(self.neu)
    }
}

/// Renderable chart description
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub bars: Vec<ChartBar>,
    pub compound: GaugeSpec,
}

/// One bar of the distribution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// Compound score gauge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSpec {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub color: String,
}

/// Sentiment analyzer backed by the VADER lexicon
pub struct SentimentAnalyzer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Score text
    ///
    /// **Algorithm:**
    /// 1. Blank text → [`SentimentResult::neutral`]
    /// 2. VADER polarity scores
    /// 3. Renormalize pos/neg/neu to sum to exactly 1 (all-zero → neu = 1)
    /// 4. Clamp compound into [-1, 1] and derive the label
    pub fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        if text.trim().is_empty() {
            return SentimentResult::neutral();
        }

        let scores = self.analyzer.polarity_scores(text);
        let score = |key: &str| {
            scores
                .get(key)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };

        let compound = score("compound").clamp(-1.0, 1.0);
        let (pos, neg, neu) = normalize_proportions(score("pos"), score("neg"), score("neu"));

        if pos == 0.0 && neg == 0.0 && compound == 0.0 {
            return SentimentResult::neutral();
        }

        SentimentResult {
            sentiment: SentimentLabel::from_compound(compound),
            compound,
            pos,
            neg,
            neu,
        }
    }

    /// Build the distribution chart for a result
    pub fn create_sentiment_chart(&self, result: &SentimentResult) -> ChartSpec {
        create_sentiment_chart(result)
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the distribution chart for a result
///
/// Pure function: bars for positive/neutral/negative proportions plus a
/// compound gauge coloured by label.
pub fn create_sentiment_chart(result: &SentimentResult) -> ChartSpec {
    let gauge_color = match result.sentiment {
        SentimentLabel::Positive => POSITIVE_COLOR,
        SentimentLabel::Negative => NEGATIVE_COLOR,
        SentimentLabel::Neutral => NEUTRAL_COLOR,
    };

    ChartSpec {
        title: "Sentiment Distribution".to_string(),
        bars: vec![
            ChartBar {
                label: "Positive".to_string(),
                value: result.pos,
                color: POSITIVE_COLOR.to_string(),
            },
            ChartBar {
                label: "Neutral".to_string(),
                value: result.neu,
                color: NEUTRAL_COLOR.to_string(),
            },
            ChartBar {
                label: "Negative".to_string(),
                value: result.neg,
                color: NEGATIVE_COLOR.to_string(),
            },
        ],
        compound: GaugeSpec {
            value: result.compound,
            min: -1.0,
            max: 1.0,
            color: gauge_color.to_string(),
        },
    }
}

/// Scale three non-negative proportions so they sum to 1
fn normalize_proportions(pos: f64, neg: f64, neu: f64) -> (f64, f64, f64) {
    let pos = pos.max(0.0);
    let neg = neg.max(0.0);
    let neu = neu.max(0.0);
    let total = pos + neg + neu;
    if total <= f64::EPSILON {
        return (0.0, 0.0, 1.0);
    }
    let pos = pos / total;
    let neg = neg / total;
    // Remainder absorbs rounding so the sum is exact
    let neu = (1.0 - pos - neg).max(0.0);
    (pos, neg, neu)
}
