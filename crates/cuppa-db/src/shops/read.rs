//! Read queries for the `shops` table.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::ShopRow;

/// Shop columns plus the latest Wi-Fi and charger report per shop.
pub(super) const SHOP_SELECT: &str = "SELECT s.id, s.public_id, s.external_id, s.name, s.address, \
            s.latitude, s.longitude, s.opening_hours, s.utc_offset_minutes, s.price_level, \
            s.rating, s.photo_refs, s.pet_friendly, \
            w.available AS wifi_available, w.detail AS wifi_detail, \
            c.available AS charger_available, c.outlet_count AS charger_count, \
            s.created_at, s.updated_at \
     FROM shops s \
     LEFT JOIN LATERAL ( \
         SELECT available, detail FROM wifi_details \
         WHERE shop_id = s.id ORDER BY updated_at DESC LIMIT 1 \
     ) w ON TRUE \
     LEFT JOIN LATERAL ( \
         SELECT available, outlet_count FROM charger_details \
         WHERE shop_id = s.id ORDER BY updated_at DESC LIMIT 1 \
     ) c ON TRUE";

/// Look up a shop by the places-provider id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_shop_by_external_id(
    pool: &PgPool,
    external_id: &str,
) -> Result<Option<ShopRow>, sqlx::Error> {
    sqlx::query_as::<_, ShopRow>(&format!("{SHOP_SELECT} WHERE s.external_id = $1"))
        .bind(external_id)
        .fetch_optional(pool)
        .await
}

/// Look up a shop by its public UUID.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_shop_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<ShopRow>, sqlx::Error> {
    sqlx::query_as::<_, ShopRow>(&format!("{SHOP_SELECT} WHERE s.public_id = $1"))
        .bind(public_id)
        .fetch_optional(pool)
        .await
}
