//! `/maps-api/*` passthrough to the places provider with the server-held key.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use cuppa_places::PlacesError;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const PHOTO_PATH: &str = "place/photo";
const DEFAULT_PHOTO_WIDTH: u32 = 400;

#[derive(Debug, Serialize)]
struct PhotoUrl {
    url: String,
}

fn map_places_error(request_id: String, error: &PlacesError) -> ApiError {
    if matches!(error, PlacesError::InvalidPath(_)) {
        return ApiError::new(request_id, "validation_error", error.to_string());
    }
    tracing::warn!(error = %error, "maps proxy request failed");
    ApiError::new(request_id, "upstream_error", error.user_message())
}

fn param<'a>(params: &'a [(String, String)], names: &[&str]) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| names.contains(&k.as_str()))
        .map(|(_, v)| v.as_str())
}

pub(super) async fn forward(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(path): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let Some(places) = state.places.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "config_error",
            "maps proxy is not configured: set CUPPA_MAPS_API_KEY",
        ));
    };

    if path.trim_matches('/') == PHOTO_PATH {
        let Some(reference) = param(&params, &["photo_reference", "photoreference"]) else {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "photo_reference is required",
            ));
        };
        let width = param(&params, &["maxwidth"])
            .and_then(|w| w.parse().ok())
            .unwrap_or(DEFAULT_PHOTO_WIDTH);

        let url = places
            .resolve_photo_url(reference, width)
            .await
            .map_err(|e| map_places_error(req_id.0.clone(), &e))?;
        return Ok(Json(PhotoUrl { url }).into_response());
    }

    let upstream = places
        .forward(&path, &params)
        .await
        .map_err(|e| map_places_error(req_id.0.clone(), &e))?;

    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = Response::builder().status(status);
    if let Some(content_type) = upstream.content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(upstream.body)).map_err(|e| {
        tracing::error!(error = %e, "could not build proxy response");
        ApiError::new(req_id.0, "internal_error", "could not build proxy response")
    })
}
