use axum::{extract::State, Extension, Json};
use cuppa_core::Coordinates;
use cuppa_search::{SearchContext, SearchOutcome};
use serde::{Deserialize, Serialize};

use crate::middleware::{CurrentActor, RequestId};

use super::{map_search_error, ApiError, ApiResponse, AppState};

const MAX_PROMPT_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    prompt: String,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    #[serde(flatten)]
    outcome: SearchOutcome,
    /// Human-readable text for the result notice, when there is one.
    notice_message: Option<String>,
}

fn validate(req_id: &str, body: &SearchBody) -> Result<Option<Coordinates>, ApiError> {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::new(req_id, "validation_error", "prompt must not be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("prompt must be at most {MAX_PROMPT_CHARS} characters"),
        ));
    }

    match (body.lat, body.lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng).map(Some).ok_or_else(|| {
            ApiError::new(req_id, "validation_error", "lat/lng out of range")
        }),
        _ => Err(ApiError::new(
            req_id,
            "validation_error",
            "lat and lng must be supplied together",
        )),
    }
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(CurrentActor(actor)): Extension<CurrentActor>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<SearchData>>, ApiError> {
    let anchor = validate(&req_id.0, &body)?;
    let Some(pipeline) = state.search.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "config_error",
            "search is not configured: set CUPPA_AI_API_KEY and CUPPA_MAPS_API_KEY",
        ));
    };

    let context = SearchContext::new(anchor, actor);
    let outcome = pipeline
        .run(body.prompt.trim(), &context)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    let notice_message = match &outcome {
        SearchOutcome::Results {
            notice: Some(notice),
            ..
        } => Some(notice.message()),
        _ => None,
    };

    Ok(Json(ApiResponse::new(
        req_id.0,
        SearchData {
            outcome,
            notice_message,
        },
    )))
}
