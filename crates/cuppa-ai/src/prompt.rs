//! Instruction text sent with every translation request.

use chrono::{DateTime, Utc};
use cuppa_core::Coordinates;

const INSTRUCTIONS: &str = r#"You turn requests for coffee shops into search filters.
Reply with exactly one JSON object and nothing else, in one of these shapes:

1. A coffee shop / cafe search:
{"type": "cafe_search",
 "keywords": "<short keyword query for a places text search, e.g. \"quiet cafe\">",
 "count": <number of results asked for, or null>,
 "filters": {
   "location": "<named area, or \"near me\", or null>",
   "openAfter": "<HH:MM 24-hour, or null>",
   "openNow": <true or null>,
   "wifi": <true or null>,
   "charger": <true or null>,
   "pets": <true or null>,
   "minRating": <number 1-5, or null>,
   "distanceKm": <number, or null>,
   "priceLevel": <maximum price level 0-4, or null>,
   "vibe": "<one word such as quiet, cozy, lively, or null>",
   "menuItems": ["<item>", ...] or null
 }}

2. A request that has nothing to do with finding a cafe:
{"type": "unrelated", "message": "<one friendly sentence explaining what you can help with>"}

3. A cafe request too vague to search:
{"type": "clarification", "message": "<one question asking for the missing detail>"}

Use null for anything the user did not ask for. Convert times like "9pm" to "21:00"
and distances like "within 2km" to 2."#;

/// Build the full prompt for one user request.
#[must_use]
pub fn build_prompt(user_prompt: &str, location: Option<Coordinates>, now: DateTime<Utc>) -> String {
    let location_line = location.map_or_else(
        || "The user's location is unknown.".to_string(),
        |c| format!("The user is at latitude {}, longitude {}.", c.lat, c.lng),
    );

    format!(
        "{INSTRUCTIONS}\n\nCurrent time (UTC): {}\n{location_line}\n\nUser request: {}",
        now.format("%Y-%m-%d %H:%M"),
        user_prompt.trim()
    )
}
