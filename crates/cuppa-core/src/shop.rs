//! Place candidates and enriched shop records.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::geo::Coordinates;

/// A text-search hit, before detail enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Places-provider id.
    pub external_id: String,
    pub name: String,
    pub location: Option<Coordinates>,
    pub address: Option<String>,
    pub rating: Option<f64>,
}

/// A day/time pair in a weekly schedule.
///
/// `day` is 0 for Sunday through 6 for Saturday; `time` is `"HHMM"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePoint {
    pub day: u8,
    pub time: String,
}

impl TimePoint {
    #[must_use]
    pub fn new(day: u8, time: &str) -> Self {
        Self {
            day,
            time: time.to_string(),
        }
    }

    /// Minutes since local midnight, or `None` for a malformed time.
    #[must_use]
    pub fn minutes(&self) -> Option<u32> {
        let digits = self.time.trim();
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let hours: u32 = digits[..2].parse().ok()?;
        let minutes: u32 = digits[2..].parse().ok()?;
        (hours <= 24 && minutes < 60).then_some(hours * 60 + minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub open: TimePoint,
    pub close: Option<TimePoint>,
}

impl Period {
    /// A period opening at `0000` with no close marks 24-hour operation.
    #[must_use]
    pub fn is_always_open(&self) -> bool {
        self.close.is_none() && self.open.time == "0000"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Provider's own "open right now" flag, evaluated at fetch time.
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

/// Crowd-sourced amenity flags. `None` means nobody has reported yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Amenities {
    pub wifi: Option<bool>,
    pub wifi_detail: Option<String>,
    pub charger: Option<bool>,
    pub charger_count: Option<i32>,
    pub pet_friendly: Option<bool>,
}

/// An enriched shop record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    /// Store-assigned id; `None` until the record has been persisted.
    pub id: Option<Uuid>,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Coordinates>,
    pub opening_hours: Option<OpeningHours>,
    pub utc_offset_minutes: Option<i32>,
    pub price_level: Option<u8>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub photo_refs: Vec<String>,
    #[serde(default)]
    pub amenities: Amenities,
}

impl Shop {
    /// Merge freshly fetched provider data over a stored record.
    ///
    /// Provider data wins for volatile fields (hours, rating, price, photos,
    /// naming, position); the stored record keeps its id and every
    /// user-submitted amenity.
    #[must_use]
    pub fn merge_provider(self, fresh: Shop) -> Shop {
        Shop {
            id: self.id,
            external_id: self.external_id,
            name: if fresh.name.trim().is_empty() {
                self.name
            } else {
                fresh.name
            },
            address: fresh.address.or(self.address),
            location: fresh.location.or(self.location),
            opening_hours: fresh.opening_hours.or(self.opening_hours),
            utc_offset_minutes: fresh.utc_offset_minutes.or(self.utc_offset_minutes),
            price_level: fresh.price_level.or(self.price_level),
            rating: fresh.rating.or(self.rating),
            photo_refs: if fresh.photo_refs.is_empty() {
                self.photo_refs
            } else {
                fresh.photo_refs
            },
            amenities: self.amenities,
        }
    }
}

const ACTOR_ID_HEX_LEN: usize = 16;

/// The authenticated identity behind a store write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
}

impl Actor {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Derive a stable actor id from a bearer token: the first 16 hex chars
    /// of its SHA-256 digest. The token itself is never stored.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let mut id = String::with_capacity(ACTOR_ID_HEX_LEN);
        for byte in &digest[..ACTOR_ID_HEX_LEN / 2] {
            let _ = write!(id, "{byte:02x}");
        }
        Self { id }
    }
}
