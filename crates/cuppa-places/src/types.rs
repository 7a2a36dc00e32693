//! Wire types for the places API JSON responses.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub results: Vec<PlaceSummary>,
}

/// One text-search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceSummary {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailsResponse {
    pub result: PlaceDetails,
}

/// Extended attributes for a single place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    #[serde(default)]
    pub name: String,
    pub formatted_address: Option<String>,
    pub geometry: Option<Geometry>,
    pub opening_hours: Option<WireOpeningHours>,
    pub utc_offset_minutes: Option<i32>,
    /// Legacy spelling of `utc_offset_minutes`.
    pub utc_offset: Option<i32>,
    pub price_level: Option<u8>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireOpeningHours {
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Vec<WirePeriod>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePeriod {
    pub open: WireTimePoint,
    pub close: Option<WireTimePoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireTimePoint {
    pub day: u8,
    pub time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub photo_reference: String,
}
