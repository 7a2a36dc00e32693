//! Row types for the `shops` table.

use chrono::{DateTime, Utc};
use cuppa_core::{Amenities, Coordinates, OpeningHours, Shop};
use sqlx::types::Json;
use uuid::Uuid;

/// A `shops` row joined with the most recent Wi-Fi and charger reports.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShopRow {
    pub id: i64,
    pub public_id: Uuid,
    pub external_id: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub opening_hours: Option<Json<OpeningHours>>,
    pub utc_offset_minutes: Option<i32>,
    pub price_level: Option<i16>,
    pub rating: Option<f64>,
    pub photo_refs: Vec<String>,
    pub pet_friendly: Option<bool>,
    pub wifi_available: Option<bool>,
    pub wifi_detail: Option<String>,
    pub charger_available: Option<bool>,
    pub charger_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShopRow {
    #[must_use]
    pub fn into_shop(self) -> Shop {
        let location = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
            _ => None,
        };

        Shop {
            id: Some(self.public_id),
            external_id: self.external_id,
            name: self.name,
            address: self.address,
            location,
            opening_hours: self.opening_hours.map(|Json(hours)| hours),
            utc_offset_minutes: self.utc_offset_minutes,
            price_level: self.price_level.and_then(|p| u8::try_from(p).ok()),
            rating: self.rating,
            photo_refs: self.photo_refs,
            amenities: Amenities {
                wifi: self.wifi_available,
                wifi_detail: self.wifi_detail,
                charger: self.charger_available,
                charger_count: self.charger_count,
                pet_friendly: self.pet_friendly,
            },
        }
    }
}
