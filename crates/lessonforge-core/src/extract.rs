//! Best-effort extraction of structure from free-form model output.
//!
//! Model responses are inconsistently wrapped in commentary or code fences,
//! so these helpers tolerate prose around the payload. This is pragmatic
//! tolerance, not a parser: the JSON path is a first-`{`-to-last-`}`
//! substring search, and the CSV path only peels a fence.

use crate::error::ToolkitError;
use crate::model::{QuestionSet, SlideDeck};

/// Locate the JSON object embedded in a model response.
///
/// Returns the substring from the first `{` to the last `}` inclusive.
/// Fails when no such pair exists; whether the substring actually parses is
/// the caller's problem.
pub fn extract_json_object(raw: &str) -> Result<&str, ToolkitError> {
    let start = raw
        .find('{')
        .ok_or_else(|| ToolkitError::malformed("no JSON object found in response", raw))?;
    let end = raw
        .rfind('}')
        .ok_or_else(|| ToolkitError::malformed("no JSON object found in response", raw))?;
    if end < start {
        return Err(ToolkitError::malformed(
            "no JSON object found in response",
            raw,
        ));
    }
    Ok(&raw[start..=end])
}

/// Strip a ```` ```csv ```` fence wrapping a CSV response, if present.
///
/// Tolerates a bare ``` opener and surrounding prose-free whitespace; a
/// response without a fence is returned trimmed. The CSV content itself is
/// never validated.
pub fn strip_csv_fence(raw: &str) -> String {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };

    // Drop the info string ("csv", or empty) up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => return trimmed.to_string(),
    };

    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

/// Parse a model response into a [`QuestionSet`].
pub fn parse_question_set(raw: &str) -> Result<QuestionSet, ToolkitError> {
    let json = extract_json_object(raw)?;
    let set: QuestionSet = serde_json::from_str(json)
        .map_err(|e| ToolkitError::malformed(format!("invalid question JSON: {e}"), raw))?;
    set.validate()
        .map_err(|reason| ToolkitError::malformed(reason, raw))?;
    Ok(set)
}

/// Parse a model response into a [`SlideDeck`].
pub fn parse_slide_deck(raw: &str) -> Result<SlideDeck, ToolkitError> {
    let json = extract_json_object(raw)?;
    let deck: SlideDeck = serde_json::from_str(json)
        .map_err(|e| ToolkitError::malformed(format!("invalid slide JSON: {e}"), raw))?;
    deck.validate()
        .map_err(|reason| ToolkitError::malformed(reason, raw))?;
    Ok(deck)
}
