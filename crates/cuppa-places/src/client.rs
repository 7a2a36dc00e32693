//! HTTP client for the places REST API.
//!
//! Wraps `reqwest` with key injection, status-envelope checks and typed
//! response deserialization. Every JSON endpoint reports success through a
//! top-level `"status"` field; anything other than `OK` (and `ZERO_RESULTS`
//! for text search) surfaces as [`PlacesError::Status`].

use std::time::Duration;

use cuppa_core::{Coordinates, PlaceCandidate, Shop};
use reqwest::{redirect, Client, Url};

use crate::error::PlacesError;
use crate::normalize::{candidate_from_summary, shop_from_details};
use crate::types::{DetailsResponse, TextSearchResponse};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Field mask for place-detail lookups. Kept to what enrichment reads.
pub const DETAIL_FIELDS: &str =
    "place_id,name,formatted_address,geometry/location,opening_hours,utc_offset,price_level,rating,photos";

/// How a text search is anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationBias {
    /// Bias results toward a point.
    Near { center: Coordinates, radius_m: u32 },
    /// Purely textual; the query names the place.
    TextOnly,
}

/// A proxied upstream response, passed back to the caller as-is.
#[derive(Debug, Clone)]
pub struct ForwardedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Client for the places API.
///
/// Use [`PlacesClient::new`] for production or [`PlacesClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    /// Same settings as `client` but never follows redirects, for photo lookups.
    no_redirect: Client,
    api_key: String,
    base_url: Url,
}

impl PlacesClient {
    /// Creates a new client pointed at the production places API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let builder = || {
            Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .connect_timeout(Duration::from_secs(10))
                .user_agent("cuppa/0.1 (cafe-search)")
        };
        let client = builder().build()?;
        let no_redirect = builder().redirect(redirect::Policy::none()).build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            no_redirect,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Keyword search for places.
    ///
    /// `ZERO_RESULTS` is a successful empty result.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Status`] for any provider status other than `OK` or
    ///   `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn text_search(
        &self,
        query: &str,
        bias: LocationBias,
    ) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let mut params = vec![("query", query.to_string())];
        if let LocationBias::Near { center, radius_m } = bias {
            params.push(("location", center.to_query_value()));
            params.push(("radius", radius_m.to_string()));
        }
        let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let url = self.build_url("place/textsearch/json", &borrowed)?;
        let body = self.request_json(&url).await?;
        if Self::check_status(&body)? == Envelope::ZeroResults {
            tracing::debug!(query, "text search returned zero results");
            return Ok(Vec::new());
        }

        let envelope: TextSearchResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("textsearch(query={query})"),
                source: e,
            })?;

        Ok(envelope
            .results
            .into_iter()
            .filter_map(candidate_from_summary)
            .collect())
    }

    /// Fetch extended detail for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Status`] for any provider status other than `OK`.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body does not match the expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<Shop, PlacesError> {
        let url = self.build_url(
            "place/details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )?;
        let body = self.request_json(&url).await?;
        if Self::check_status(&body)? == Envelope::ZeroResults {
            return Err(PlacesError::Status {
                status: "ZERO_RESULTS".to_string(),
                message: format!("no detail for place {place_id}"),
            });
        }

        let envelope: DetailsResponse =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details(place_id={place_id})"),
                source: e,
            })?;

        Ok(shop_from_details(envelope.result))
    }

    /// Resolve a photo reference to the final image URL without downloading
    /// the image.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::MissingRedirect`] if the provider does not redirect.
    /// - [`PlacesError::Http`] on network failure.
    pub async fn resolve_photo_url(
        &self,
        photo_reference: &str,
        max_width: u32,
    ) -> Result<String, PlacesError> {
        let width = max_width.to_string();
        let url = self.build_url(
            "place/photo",
            &[("maxwidth", width.as_str()), ("photo_reference", photo_reference)],
        )?;
        let response = self.no_redirect.get(url).send().await?;
        let status = response.status();

        if status.is_redirection() {
            if let Some(location) = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
            {
                return Ok(location.to_string());
            }
        }

        Err(PlacesError::MissingRedirect {
            status: status.as_u16(),
        })
    }

    /// Forward a GET to `path` under the base URL, injecting the server-held
    /// key. Any caller-supplied `key` parameter is dropped.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidPath`] if `path` tries to leave the base URL.
    /// - [`PlacesError::Http`] on network failure.
    pub async fn forward(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<ForwardedResponse, PlacesError> {
        let filtered: Vec<(&str, &str)> = params
            .iter()
            .filter(|(k, _)| !k.eq_ignore_ascii_case("key"))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let url = self.build_url(path, &filtered)?;

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let body = response.bytes().await?.to_vec();

        tracing::debug!(path, status, bytes = body.len(), "forwarded places request");

        Ok(ForwardedResponse {
            status,
            content_type,
            body,
        })
    }

    /// Builds `base_url + path` with the key and `extra` as encoded query
    /// parameters.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let relative = path.trim_start_matches('/');
        if relative.is_empty()
            || relative.contains("://")
            || relative.contains(['\\', '%'])
            || relative.split('/').any(|segment| segment == "..")
        {
            return Err(PlacesError::InvalidPath(path.to_string()));
        }

        let mut url = self
            .base_url
            .join(relative)
            .map_err(|_| PlacesError::InvalidPath(path.to_string()))?;
        if !self.is_under_base(&url) {
            return Err(PlacesError::InvalidPath(path.to_string()));
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// The key may only travel to the configured origin, below its base path.
    fn is_under_base(&self, url: &Url) -> bool {
        url.scheme() == self.base_url.scheme()
            && url.host_str() == self.base_url.host_str()
            && url.port_or_known_default() == self.base_url.port_or_known_default()
            && url.path().starts_with(self.base_url.path())
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }

    /// Checks the top-level `"status"` field.
    fn check_status(body: &serde_json::Value) -> Result<Envelope, PlacesError> {
        let status = body
            .get("status")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("UNKNOWN_ERROR");
        match status {
            "OK" => Ok(Envelope::Ok),
            "ZERO_RESULTS" => Ok(Envelope::ZeroResults),
            other => {
                let message = body
                    .get("error_message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("no error message")
                    .to_string();
                tracing::warn!(status = other, %message, "places API returned an error status");
                Err(PlacesError::Status {
                    status: other.to_string(),
                    message,
                })
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Envelope {
    Ok,
    ZeroResults,
}
