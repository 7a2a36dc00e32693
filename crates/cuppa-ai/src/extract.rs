//! Pulling a JSON object out of a model reply.
//!
//! Models are asked for bare JSON but often wrap it in prose or a fenced
//! code block. Extraction tries a direct parse first, then falls back once
//! to the first fenced block or, failing that, the first balanced
//! `{ ... }` object in the text.

use regex::Regex;
use serde_json::Value;

/// Returns the first JSON object found in `text`, or `None`.
#[must_use]
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    let fallback = fenced_block(trimmed).or_else(|| balanced_object(trimmed))?;
    let value = parse_object(fallback);
    if value.is_none() {
        tracing::debug!(chars = trimmed.len(), "no JSON object in model reply");
    }
    value
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(Value::is_object)
}

/// Body of the first ```` ``` ```` fenced block, with an optional language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let pattern = Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)```").expect("valid regex");
    pattern
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| !body.is_empty())
}

/// The first `{` and its matching `}`, skipping braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
