//! Conversion from places wire types into domain records.

use cuppa_core::{Amenities, Coordinates, OpeningHours, Period, PlaceCandidate, Shop, TimePoint};

use crate::types::{Geometry, PlaceDetails, PlaceSummary, WireOpeningHours, WireTimePoint};

/// Highest price level the provider defines (0 = free, 4 = very expensive).
pub const MAX_PRICE_LEVEL: u8 = 4;

/// Convert a text-search hit. Hits without a place id are unusable and dropped.
#[must_use]
pub fn candidate_from_summary(summary: PlaceSummary) -> Option<PlaceCandidate> {
    if summary.place_id.trim().is_empty() {
        tracing::debug!(name = %summary.name, "dropping search hit without place_id");
        return None;
    }
    Some(PlaceCandidate {
        external_id: summary.place_id,
        name: summary.name,
        location: coordinates(summary.geometry.as_ref()),
        address: summary.formatted_address,
        rating: summary.rating,
    })
}

/// Convert a place-detail payload into a shop record with no stored id and
/// no amenity data.
#[must_use]
pub fn shop_from_details(details: PlaceDetails) -> Shop {
    Shop {
        id: None,
        external_id: details.place_id,
        name: details.name,
        address: details.formatted_address,
        location: coordinates(details.geometry.as_ref()),
        opening_hours: details.opening_hours.map(opening_hours),
        utc_offset_minutes: details.utc_offset_minutes.or(details.utc_offset),
        price_level: details.price_level.filter(|p| *p <= MAX_PRICE_LEVEL),
        rating: details.rating,
        photo_refs: details
            .photos
            .into_iter()
            .map(|p| p.photo_reference)
            .filter(|r| !r.is_empty())
            .collect(),
        amenities: Amenities::default(),
    }
}

fn coordinates(geometry: Option<&Geometry>) -> Option<Coordinates> {
    geometry.and_then(|g| Coordinates::new(g.location.lat, g.location.lng))
}

fn opening_hours(wire: WireOpeningHours) -> OpeningHours {
    OpeningHours {
        open_now: wire.open_now,
        periods: wire
            .periods
            .into_iter()
            .map(|p| Period {
                open: time_point(p.open),
                close: p.close.map(time_point),
            })
            .collect(),
        weekday_text: wire.weekday_text,
    }
}

fn time_point(wire: WireTimePoint) -> TimePoint {
    TimePoint {
        day: wire.day % 7,
        time: wire.time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_without_place_id_is_dropped() {
        let summary: PlaceSummary =
            serde_json::from_value(serde_json::json!({ "name": "Nameless" })).expect("summary");
        assert!(candidate_from_summary(summary).is_none());
    }

    #[test]
    fn details_map_hours_and_photos() {
        let details: PlaceDetails = serde_json::from_value(serde_json::json!({
            "place_id": "abc",
            "name": "Night Owl",
            "geometry": { "location": { "lat": 25.04, "lng": 121.56 } },
            "utc_offset": 480,
            "price_level": 2,
            "rating": 4.4,
            "opening_hours": {
                "open_now": false,
                "periods": [
                    { "open": { "day": 1, "time": "2200" }, "close": { "day": 2, "time": "0200" } }
                ]
            },
            "photos": [ { "photo_reference": "ref-1" }, { "photo_reference": "" } ]
        }))
        .expect("details");

        let shop = shop_from_details(details);
        assert_eq!(shop.external_id, "abc");
        assert_eq!(shop.utc_offset_minutes, Some(480));
        assert_eq!(shop.price_level, Some(2));
        assert_eq!(shop.photo_refs, vec!["ref-1".to_string()]);
        let hours = shop.opening_hours.expect("hours");
        assert_eq!(hours.open_now, Some(false));
        assert_eq!(hours.periods.len(), 1);
        assert_eq!(hours.periods[0].close.as_ref().map(|c| c.day), Some(2));
        assert!(shop.location.is_some());
        assert!(shop.id.is_none());
    }

    #[test]
    fn out_of_range_price_level_is_dropped() {
        let details: PlaceDetails = serde_json::from_value(serde_json::json!({
            "place_id": "pricey",
            "name": "Gold Leaf Espresso",
            "price_level": 7
        }))
        .expect("details");

        assert_eq!(shop_from_details(details).price_level, None);
    }
}
