//! Decoding of insight replies
//!
//! Replies are expected as `{"insights": [{"topic": .., "detail": ..}]}`.
//! Models sometimes wrap JSON in Markdown fences or prose, so the first
//! balanced JSON value is extracted before strict decoding. Any malformed
//! entry fails the whole reply; partial lists are never returned.

use serde::{Deserialize, Serialize};

use super::GenerationError;

/// One topic-labelled insight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub topic: String,
    pub detail: String,
}

/// Key insights result, in the order the service returned them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyInsights {
    pub insights: Vec<Insight>,
}

/// Accepted top-level shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsightsPayload {
    Wrapped(KeyInsights),
    Bare(Vec<Insight>),
}

/// Decode a service reply into insights
pub fn parse_insights(reply: &str) -> Result<KeyInsights, GenerationError> {
    let json = extract_json(reply).ok_or_else(|| {
        GenerationError::Parse("no JSON object found in insights response".to_string())
    })?;

    let payload: InsightsPayload = serde_json::from_str(json).map_err(|e| {
        GenerationError::Parse(format!("insights response has unexpected shape: {}", e))
    })?;

    let insights = match payload {
        InsightsPayload::Wrapped(wrapped) => wrapped.insights,
        InsightsPayload::Bare(list) => list,
    };

    Ok(KeyInsights {
        insights: insights
            .into_iter()
            .map(|insight| Insight {
                topic: insight.topic.trim().to_string(),
                detail: insight.detail.trim().to_string(),
            })
            .collect(),
    })
}

/// First balanced `{..}` or `[..]` span in `reply`
///
/// Brackets inside JSON string literals are skipped.
fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find(['{', '['])?;
    let body = &reply[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in body.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&body[..idx + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
