//! Concurrent detail enrichment of text-search candidates.

use cuppa_core::{Actor, PlaceCandidate, Shop};
use futures::future::join_all;

use crate::ports::{PlaceLookup, ShopStore};

/// Upper bound on detail fetches per search.
pub const MAX_ENRICHED_CANDIDATES: usize = 10;

/// Fetch detail for the first [`MAX_ENRICHED_CANDIDATES`] candidates at once
/// and combine each with its stored record.
///
/// Known shops get fresh provider data merged over the stored record. Unknown
/// shops are inserted on behalf of `actor`; without an actor they are dropped.
/// A failure for one candidate drops only that candidate. Output keeps
/// candidate order.
pub async fn enrich_candidates<P, S>(
    places: &P,
    store: &S,
    candidates: &[PlaceCandidate],
    actor: Option<&Actor>,
) -> Vec<Shop>
where
    P: PlaceLookup,
    S: ShopStore,
{
    let fetches = candidates
        .iter()
        .take(MAX_ENRICHED_CANDIDATES)
        .map(|candidate| enrich_one(places, store, candidate, actor));

    let shops: Vec<Shop> = join_all(fetches).await.into_iter().flatten().collect();
    tracing::debug!(
        candidates = candidates.len(),
        enriched = shops.len(),
        "detail enrichment finished"
    );
    shops
}

async fn enrich_one<P, S>(
    places: &P,
    store: &S,
    candidate: &PlaceCandidate,
    actor: Option<&Actor>,
) -> Option<Shop>
where
    P: PlaceLookup,
    S: ShopStore,
{
    let external_id = candidate.external_id.as_str();

    let fresh = match places.place_details(external_id).await {
        Ok(shop) => shop,
        Err(e) => {
            tracing::warn!(external_id, error = %e, "place detail fetch failed");
            return None;
        }
    };

    match store.find_by_external_id(external_id).await {
        Ok(Some(stored)) => Some(stored.merge_provider(fresh)),
        Ok(None) => {
            let Some(actor) = actor else {
                tracing::debug!(external_id, "unknown shop and no actor; skipping");
                return None;
            };
            match store.insert(&fresh, actor).await {
                Ok(shop) => Some(shop),
                Err(e) => {
                    tracing::warn!(external_id, error = %e, "storing new shop failed");
                    None
                }
            }
        }
        Err(e) => {
            tracing::warn!(external_id, error = %e, "shop lookup failed");
            None
        }
    }
}
