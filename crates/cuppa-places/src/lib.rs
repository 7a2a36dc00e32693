//! Client for the places provider: text search, place detail, photo
//! redirects and raw request forwarding for the `/maps-api` proxy.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{ForwardedResponse, LocationBias, PlacesClient, DETAIL_FIELDS};
pub use error::PlacesError;
