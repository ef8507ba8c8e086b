//! Instruction templates for the text-generation service

use std::borrow::Cow;

/// Input beyond this many characters is cut before prompting
pub const MAX_PROMPT_CHARS: usize = 24_000;

pub const SYSTEM_PROMPT: &str = "You are an experienced financial analyst. You read financial \
texts such as earnings reports, filings, news articles and market commentary. Base every \
statement strictly on the provided text and do not invent figures.";

/// Concise summary request
pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following financial text in 3 to 5 sentences. Cover the key figures, \
         the main developments, notable risks and the outlook where they are mentioned.\n\n\
         Text:\n\"\"\"\n{}\n\"\"\"",
        truncate_for_prompt(text)
    )
}

/// Topic-tagged insights request
///
/// The reply must be a JSON object so it can be decoded into `Insight`s.
pub fn insights_prompt(text: &str) -> String {
    format!(
        "Extract the 3 to 6 most important insights from the following financial text.\n\
         Respond with a JSON object only, in exactly this shape:\n\
         {{\"insights\": [{{\"topic\": \"short topic label\", \"detail\": \"one or two sentence explanation\"}}]}}\n\n\
         Text:\n\"\"\"\n{}\n\"\"\"",
        truncate_for_prompt(text)
    )
}

/// Question answering request
pub fn question_prompt(text: &str, question: &str) -> String {
    format!(
        "Answer the question using only the financial text below. If the text does not \
         contain the answer, say so plainly.\n\n\
         Text:\n\"\"\"\n{}\n\"\"\"\n\n\
         Question: {}",
        truncate_for_prompt(text),
        question.trim()
    )
}

/// Cut text to [`MAX_PROMPT_CHARS`] characters on a char boundary
pub fn truncate_for_prompt(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(MAX_PROMPT_CHARS) {
        Some((idx, _)) => {
            tracing::debug!(
                original_chars = text.chars().count(),
                kept_chars = MAX_PROMPT_CHARS,
                "Truncating text for prompt"
            );
            Cow::Owned(format!("{} [truncated]", &text[..idx]))
        }
        None => Cow::Borrowed(text),
    }
}
