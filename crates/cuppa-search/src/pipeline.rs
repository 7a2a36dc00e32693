//! End-to-end search: prompt, translation, candidates, enrichment, filters.

use chrono::{DateTime, Utc};
use cuppa_ai::{FilterTranslator, GeminiClient, Translation};
use cuppa_core::{Actor, AppConfig, Coordinates, FilterSet, SearchRequest, Shop};
use cuppa_places::{LocationBias, PlacesClient};
use serde::Serialize;
use sqlx::PgPool;

use crate::enrich::enrich_candidates;
use crate::error::SearchError;
use crate::filter::{apply_filters, FilterNotice, FilterReport};
use crate::ports::{PgShopStore, PlaceLookup, ShopStore, Translator};

/// Text-search radius when the prompt names no distance.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 5_000;
/// Largest radius the places provider accepts.
pub const MAX_SEARCH_RADIUS_M: u32 = 50_000;

/// Per-request inputs that do not come from the prompt.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Caller's position, when known.
    pub anchor: Option<Coordinates>,
    /// Identity used to store shops seen for the first time.
    pub actor: Option<Actor>,
    pub now: DateTime<Utc>,
}

impl SearchContext {
    #[must_use]
    pub fn new(anchor: Option<Coordinates>, actor: Option<Actor>) -> Self {
        Self {
            anchor,
            actor,
            now: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchOutcome {
    Unrelated {
        message: String,
    },
    NeedsClarification {
        message: String,
    },
    Results {
        keywords: String,
        filters: FilterSet,
        shops: Vec<Shop>,
        notice: Option<FilterNotice>,
        report: FilterReport,
    },
}

pub struct SearchPipeline<T, P, S> {
    translator: T,
    places: P,
    store: S,
    default_location: Coordinates,
}

impl SearchPipeline<FilterTranslator, PlacesClient, PgShopStore> {
    /// Build the production pipeline from configuration.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Config`] if either API key is missing.
    /// - [`SearchError::Ai`] / [`SearchError::Places`] if an HTTP client cannot
    ///   be constructed from the configured base URLs.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<Self, SearchError> {
        let gemini = GeminiClient::with_base_url(
            config.require_ai_api_key()?,
            &config.ai_model,
            config.http_timeout_secs,
            &config.ai_base_url,
        )?;
        let places = PlacesClient::with_base_url(
            config.require_maps_api_key()?,
            config.http_timeout_secs,
            &config.places_base_url,
        )?;

        Ok(Self::new(
            FilterTranslator::new(gemini),
            places,
            PgShopStore::new(pool),
            config.default_location,
        ))
    }
}

impl<T, P, S> SearchPipeline<T, P, S>
where
    T: Translator,
    P: PlaceLookup,
    S: ShopStore,
{
    #[must_use]
    pub fn new(translator: T, places: P, store: S, default_location: Coordinates) -> Self {
        Self {
            translator,
            places,
            store,
            default_location,
        }
    }

    /// Run one search.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Ai`] if the model call fails or its reply cannot be
    ///   interpreted.
    /// - [`SearchError::Places`] if the candidate search fails. Detail
    ///   failures for individual candidates are not errors.
    pub async fn run(
        &self,
        prompt: &str,
        context: &SearchContext,
    ) -> Result<SearchOutcome, SearchError> {
        let request = match self
            .translator
            .translate(prompt, context.anchor, context.now)
            .await?
        {
            Translation::CafeSearch(request) => request,
            Translation::Unrelated { message } => {
                tracing::info!("prompt classified as unrelated");
                return Ok(SearchOutcome::Unrelated { message });
            }
            Translation::NeedsClarification { message } => {
                tracing::info!("prompt needs clarification");
                return Ok(SearchOutcome::NeedsClarification { message });
            }
        };

        let anchor = context.anchor.unwrap_or(self.default_location);
        let (query, bias) = search_query(&request, anchor);
        tracing::info!(query = %query, ?bias, "searching places");

        let candidates = self.places.text_search(&query, bias).await?;
        let shops = enrich_candidates(
            &self.places,
            &self.store,
            &candidates,
            context.actor.as_ref(),
        )
        .await;

        let outcome = apply_filters(shops, &request.filters, anchor, context.now);
        tracing::info!(
            candidates = candidates.len(),
            results = outcome.shops.len(),
            relaxed = outcome.report.relaxed,
            "search finished"
        );

        Ok(SearchOutcome::Results {
            keywords: request.keywords,
            filters: request.filters,
            shops: outcome.shops,
            notice: outcome.notice,
            report: outcome.report,
        })
    }
}

/// Text-search query and bias for a translated request.
///
/// A named place is appended to the keywords (unless already there) and the
/// search is purely textual. Otherwise the search is biased around `anchor`
/// with a radius derived from the distance filter.
#[must_use]
pub fn search_query(request: &SearchRequest, anchor: Coordinates) -> (String, LocationBias) {
    let keywords = request.keywords.trim();

    if let Some(place) = request.filters.specific_location() {
        let query = if keywords.to_lowercase().contains(&place.to_lowercase()) {
            keywords.to_string()
        } else {
            format!("{keywords} {place}")
        };
        return (query, LocationBias::TextOnly);
    }

    (
        keywords.to_string(),
        LocationBias::Near {
            center: anchor,
            radius_m: radius_for(request.filters.distance_km),
        },
    )
}

fn radius_for(distance_km: Option<f64>) -> u32 {
    match distance_km {
        Some(km) if km.is_finite() && km > 0.0 => {
            let metres = (km * 1000.0).round().min(f64::from(MAX_SEARCH_RADIUS_M));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let metres = metres as u32;
            metres.max(1)
        }
        _ => DEFAULT_SEARCH_RADIUS_M,
    }
}
