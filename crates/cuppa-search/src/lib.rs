//! Prompt-to-results search orchestration.
//!
//! A search runs in four steps: the language model turns the prompt into
//! keywords and a [`cuppa_core::FilterSet`], the places provider returns
//! candidates, up to [`MAX_ENRICHED_CANDIDATES`] candidates are enriched
//! concurrently with provider detail and stored amenity reports, and the
//! filter pipeline narrows the enriched set.

pub mod enrich;
pub mod error;
pub mod filter;
pub mod hours;
pub mod pipeline;
pub mod ports;

pub use enrich::{enrich_candidates, MAX_ENRICHED_CANDIDATES};
pub use error::SearchError;
pub use filter::{apply_filters, FilterNotice, FilterOutcome, FilterReport, FilterStage, StageCount};
pub use hours::{is_open_now, matches_open_after};
pub use pipeline::{
    search_query, SearchContext, SearchOutcome, SearchPipeline, DEFAULT_SEARCH_RADIUS_M,
    MAX_SEARCH_RADIUS_M,
};
pub use ports::{PgShopStore, PlaceLookup, ShopStore, Translator};
