//! Classifying a model reply into a search request.

use chrono::{DateTime, Utc};
use cuppa_core::{Coordinates, FilterSet, SearchRequest};
use serde::Deserialize;

use crate::client::GeminiClient;
use crate::error::AiError;
use crate::extract::extract_json;
use crate::prompt::build_prompt;

const DEFAULT_UNRELATED_MESSAGE: &str =
    "I can only help you find coffee shops. Try something like \"quiet cafe with wifi\".";
const DEFAULT_CLARIFICATION_MESSAGE: &str =
    "Could you tell me a bit more about the kind of cafe you're looking for?";

/// What the model made of a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    CafeSearch(SearchRequest),
    Unrelated { message: String },
    NeedsClarification { message: String },
}

#[derive(Debug, Deserialize)]
struct RawTranslation {
    #[serde(rename = "type")]
    kind: String,
    keywords: Option<String>,
    count: Option<usize>,
    #[serde(default)]
    filters: Option<FilterSet>,
    message: Option<String>,
}

/// Parse a raw model reply.
///
/// # Errors
///
/// Returns [`AiError::MalformedResponse`] when no JSON object can be
/// extracted, the object has the wrong shape, the `type` is unknown, or a
/// café search has empty keywords.
pub fn parse_translation(reply: &str) -> Result<Translation, AiError> {
    let value = extract_json(reply)
        .ok_or_else(|| AiError::MalformedResponse("no JSON object in reply".to_string()))?;
    let raw: RawTranslation = serde_json::from_value(value)
        .map_err(|e| AiError::MalformedResponse(format!("unexpected JSON shape: {e}")))?;

    let message = raw
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    match raw.kind.trim().to_ascii_lowercase().as_str() {
        "cafe_search" | "search" => {
            let mut filters = raw.filters.unwrap_or_default();
            filters.count = raw.count.or(filters.count).filter(|&n| n > 0);

            let keywords = raw
                .keywords
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AiError::MalformedResponse("cafe search without keywords".to_string())
                })?;

            Ok(Translation::CafeSearch(SearchRequest {
                keywords: fold_keywords(keywords, &filters),
                filters,
            }))
        }
        "unrelated" => Ok(Translation::Unrelated {
            message: message.unwrap_or_else(|| DEFAULT_UNRELATED_MESSAGE.to_string()),
        }),
        "clarification" | "needs_clarification" => Ok(Translation::NeedsClarification {
            message: message.unwrap_or_else(|| DEFAULT_CLARIFICATION_MESSAGE.to_string()),
        }),
        other => Err(AiError::MalformedResponse(format!(
            "unknown reply type '{other}'"
        ))),
    }
}

/// Vibe and menu items have no shop-side data to filter on, so they ride
/// along in the keyword query instead.
fn fold_keywords(keywords: &str, filters: &FilterSet) -> String {
    let mut folded = keywords.to_string();
    let extras = filters
        .vibe
        .iter()
        .chain(filters.menu_items.iter().flatten());

    for extra in extras {
        let extra = extra.trim();
        if extra.is_empty() {
            continue;
        }
        if !folded
            .to_ascii_lowercase()
            .contains(&extra.to_ascii_lowercase())
        {
            folded.push(' ');
            folded.push_str(extra);
        }
    }
    folded
}

/// Translates free-text prompts with a [`GeminiClient`].
#[derive(Clone)]
pub struct FilterTranslator {
    client: GeminiClient,
}

impl FilterTranslator {
    #[must_use]
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    /// One model call, no retry.
    ///
    /// # Errors
    ///
    /// Propagates [`AiError`] from the model call or from [`parse_translation`].
    pub async fn translate(
        &self,
        prompt: &str,
        location: Option<Coordinates>,
        now: DateTime<Utc>,
    ) -> Result<Translation, AiError> {
        let reply = self
            .client
            .generate(&build_prompt(prompt, location, now))
            .await?;
        let translation = parse_translation(&reply);
        if let Err(e) = &translation {
            tracing::warn!(error = %e, "could not interpret model reply");
        }
        translation
    }
}
