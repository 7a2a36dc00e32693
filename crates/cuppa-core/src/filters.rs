//! The sparse filter set produced by prompt translation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Phrases that mean "use my position" rather than a named place.
const NEAR_ME_PHRASES: &[&str] = &[
    "near me",
    "nearby",
    "around me",
    "close to me",
    "here",
    "current location",
    "my location",
];

/// A wall-clock time of day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    #[must_use]
    pub fn minutes_since_midnight(self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = String;

    /// Accepts `HH:MM`, `H:MM` and `HHMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (h, m) = match raw.split_once(':') {
            Some((h, m)) => (h, m),
            None if raw.len() == 4 => raw.split_at(2),
            None => return Err(format!("unrecognised time '{s}'")),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || !all_digits(m) || h.len() > 2 || m.len() != 2 {
            return Err(format!("unrecognised time '{s}'"));
        }
        let hour: u8 = h.parse().map_err(|_| format!("unrecognised time '{s}'"))?;
        let minute: u8 = m.parse().map_err(|_| format!("unrecognised time '{s}'"))?;
        Self::new(hour, minute).ok_or_else(|| format!("time out of range '{s}'"))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Optional search predicates. Every field absent means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// Named geographic term ("Shibuya", "downtown Austin") or a near-me phrase.
    pub location: Option<String>,
    pub open_after: Option<ClockTime>,
    pub open_now: Option<bool>,
    pub wifi: Option<bool>,
    pub charger: Option<bool>,
    pub pets: Option<bool>,
    pub min_rating: Option<f64>,
    pub distance_km: Option<f64>,
    /// Maximum acceptable price level (0 = free .. 4 = very expensive).
    pub price_level: Option<u8>,
    pub vibe: Option<String>,
    pub menu_items: Option<Vec<String>>,
    /// Number of results requested.
    pub count: Option<usize>,
}

impl FilterSet {
    /// The geographic term, unless it is missing or just means "near me".
    #[must_use]
    pub fn specific_location(&self) -> Option<&str> {
        let term = self.location.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let lowered = term.to_ascii_lowercase();
        if NEAR_ME_PHRASES.iter().any(|p| lowered == *p) {
            return None;
        }
        Some(term)
    }

    #[must_use]
    pub fn requires_open_now(&self) -> bool {
        self.open_now == Some(true)
    }

    /// Copy of this filter set with the open-now predicate removed.
    #[must_use]
    pub fn without_open_now(&self) -> Self {
        Self {
            open_now: None,
            ..self.clone()
        }
    }
}

/// A prompt classified as a café search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Keyword string for the places text search. Never empty.
    pub keywords: String,
    pub filters: FilterSet,
}
