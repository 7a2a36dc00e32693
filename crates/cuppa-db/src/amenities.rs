//! Crowd-sourced amenity reports.
//!
//! Each actor holds at most one Wi-Fi and one charger report per shop;
//! resubmitting replaces the earlier report.

use cuppa_core::Actor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Record whether `shop` has Wi-Fi, with an optional free-text note
/// (network name, speed, password policy).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shop has `shop` as its public id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn upsert_wifi_detail(
    pool: &PgPool,
    shop: Uuid,
    actor: &Actor,
    available: bool,
    detail: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO wifi_details (shop_id, submitted_by, available, detail) \
         SELECT id, $2, $3, $4 FROM shops WHERE public_id = $1 \
         ON CONFLICT (shop_id, submitted_by) DO UPDATE SET \
             available  = EXCLUDED.available, \
             detail     = EXCLUDED.detail, \
             updated_at = NOW()",
    )
    .bind(shop)
    .bind(&actor.id)
    .bind(available)
    .bind(detail)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    tracing::debug!(%shop, actor = %actor.id, available, "recorded wifi report");
    Ok(())
}

/// Record whether `shop` has charging outlets and, optionally, how many.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shop has `shop` as its public id, or
/// [`DbError::Sqlx`] if the query fails (including a negative outlet count).
pub async fn upsert_charger_detail(
    pool: &PgPool,
    shop: Uuid,
    actor: &Actor,
    available: bool,
    outlet_count: Option<i32>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO charger_details (shop_id, submitted_by, available, outlet_count) \
         SELECT id, $2, $3, $4 FROM shops WHERE public_id = $1 \
         ON CONFLICT (shop_id, submitted_by) DO UPDATE SET \
             available    = EXCLUDED.available, \
             outlet_count = EXCLUDED.outlet_count, \
             updated_at   = NOW()",
    )
    .bind(shop)
    .bind(&actor.id)
    .bind(available)
    .bind(outlet_count)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    tracing::debug!(%shop, actor = %actor.id, available, "recorded charger report");
    Ok(())
}

/// Set the shop-level pet-friendly flag. Last writer wins.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shop has `shop` as its public id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn set_pet_friendly(
    pool: &PgPool,
    shop: Uuid,
    actor: &Actor,
    pet_friendly: bool,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE shops \
         SET pet_friendly = $2, pet_reported_by = $3, updated_at = NOW() \
         WHERE public_id = $1",
    )
    .bind(shop)
    .bind(pet_friendly)
    .bind(&actor.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    tracing::debug!(%shop, actor = %actor.id, pet_friendly, "recorded pet report");
    Ok(())
}
