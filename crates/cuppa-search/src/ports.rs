//! Seams between the search pipeline and its collaborators.
//!
//! Production code plugs in [`PlacesClient`], [`FilterTranslator`] and
//! [`PgShopStore`]; tests substitute in-memory doubles.

use std::future::Future;

use chrono::{DateTime, Utc};
use cuppa_ai::{AiError, FilterTranslator, Translation};
use cuppa_core::{Actor, Coordinates, PlaceCandidate, Shop};
use cuppa_db::DbError;
use cuppa_places::{LocationBias, PlacesClient, PlacesError};
use sqlx::PgPool;

/// Turns a free-text prompt into a classified search request.
pub trait Translator: Send + Sync {
    fn translate(
        &self,
        prompt: &str,
        location: Option<Coordinates>,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Translation, AiError>> + Send;
}

/// Candidate search and per-place detail.
pub trait PlaceLookup: Send + Sync {
    fn text_search(
        &self,
        query: &str,
        bias: LocationBias,
    ) -> impl Future<Output = Result<Vec<PlaceCandidate>, PlacesError>> + Send;

    fn place_details(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Shop, PlacesError>> + Send;
}

/// Persistent shop records with crowd-sourced amenities.
pub trait ShopStore: Send + Sync {
    fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = Result<Option<Shop>, DbError>> + Send;

    /// Create a record for a shop seen for the first time.
    fn insert(
        &self,
        shop: &Shop,
        actor: &Actor,
    ) -> impl Future<Output = Result<Shop, DbError>> + Send;
}

impl Translator for FilterTranslator {
    async fn translate(
        &self,
        prompt: &str,
        location: Option<Coordinates>,
        now: DateTime<Utc>,
    ) -> Result<Translation, AiError> {
        FilterTranslator::translate(self, prompt, location, now).await
    }
}

impl PlaceLookup for PlacesClient {
    async fn text_search(
        &self,
        query: &str,
        bias: LocationBias,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        PlacesClient::text_search(self, query, bias).await
    }

    async fn place_details(&self, external_id: &str) -> Result<Shop, PlacesError> {
        PlacesClient::place_details(self, external_id).await
    }
}

/// [`ShopStore`] backed by the Postgres `shops` tables.
#[derive(Debug, Clone)]
pub struct PgShopStore {
    pool: PgPool,
}

impl PgShopStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ShopStore for PgShopStore {
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Shop>, DbError> {
        let row = cuppa_db::get_shop_by_external_id(&self.pool, external_id).await?;
        Ok(row.map(cuppa_db::ShopRow::into_shop))
    }

    async fn insert(&self, shop: &Shop, actor: &Actor) -> Result<Shop, DbError> {
        let row = cuppa_db::insert_shop(&self.pool, shop, actor).await?;
        Ok(row.into_shop())
    }
}
