//! Write operations for the `shops` table.

use cuppa_core::{Actor, Shop};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::read::get_shop_by_public_id;
use super::types::ShopRow;
use crate::DbError;

/// Insert a shop created from provider detail, attributed to `actor`.
///
/// A concurrent insert of the same `external_id` turns into a refresh of the
/// provider fields; `created_by` and crowd-sourced columns are left alone.
/// Returns the stored row including any amenity reports.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, or [`DbError::NotFound`] if the
/// row cannot be read back.
pub async fn insert_shop(pool: &PgPool, shop: &Shop, actor: &Actor) -> Result<ShopRow, DbError> {
    let opening_hours = shop.opening_hours.as_ref().map(Json);
    let price_level = shop.price_level.map(i16::from);

    let public_id: Uuid = sqlx::query_scalar(
        "INSERT INTO shops \
             (external_id, name, address, latitude, longitude, opening_hours, \
              utc_offset_minutes, price_level, rating, photo_refs, created_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (external_id) DO UPDATE SET \
             name               = EXCLUDED.name, \
             address            = EXCLUDED.address, \
             latitude           = EXCLUDED.latitude, \
             longitude          = EXCLUDED.longitude, \
             opening_hours      = EXCLUDED.opening_hours, \
             utc_offset_minutes = EXCLUDED.utc_offset_minutes, \
             price_level        = EXCLUDED.price_level, \
             rating             = EXCLUDED.rating, \
             photo_refs         = EXCLUDED.photo_refs, \
             updated_at         = NOW() \
         RETURNING public_id",
    )
    .bind(&shop.external_id)
    .bind(&shop.name)
    .bind(&shop.address)
    .bind(shop.location.map(|c| c.lat))
    .bind(shop.location.map(|c| c.lng))
    .bind(opening_hours)
    .bind(shop.utc_offset_minutes)
    .bind(price_level)
    .bind(shop.rating)
    .bind(&shop.photo_refs)
    .bind(&actor.id)
    .fetch_one(pool)
    .await?;

    tracing::debug!(external_id = %shop.external_id, %public_id, actor = %actor.id, "stored shop");

    get_shop_by_public_id(pool, public_id)
        .await?
        .ok_or(DbError::NotFound)
}
