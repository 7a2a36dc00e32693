//! Per-actor shop ratings.

use cuppa_core::Actor;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Aggregate of every actor's rating for a shop.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
}

/// Insert or replace `actor`'s rating for `shop`. `score` must be 1-5.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no shop has `shop` as its public id, or
/// [`DbError::Sqlx`] if the query fails (including an out-of-range score).
pub async fn upsert_rating(
    pool: &PgPool,
    shop: Uuid,
    actor: &Actor,
    score: i16,
    comment: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "INSERT INTO shop_ratings (shop_id, submitted_by, score, comment) \
         SELECT id, $2, $3, $4 FROM shops WHERE public_id = $1 \
         ON CONFLICT (shop_id, submitted_by) DO UPDATE SET \
             score      = EXCLUDED.score, \
             comment    = EXCLUDED.comment, \
             updated_at = NOW()",
    )
    .bind(shop)
    .bind(&actor.id)
    .bind(score)
    .bind(comment)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    tracing::debug!(%shop, actor = %actor.id, score, "recorded rating");
    Ok(())
}

/// Average score and number of ratings for `shop`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_rating_summary(pool: &PgPool, shop: Uuid) -> Result<RatingSummary, DbError> {
    let summary = sqlx::query_as::<_, RatingSummary>(
        "SELECT AVG(r.score)::DOUBLE PRECISION AS average, COUNT(r.id) AS count \
         FROM shops s \
         LEFT JOIN shop_ratings r ON r.shop_id = s.id \
         WHERE s.public_id = $1",
    )
    .bind(shop)
    .fetch_one(pool)
    .await?;
    Ok(summary)
}
