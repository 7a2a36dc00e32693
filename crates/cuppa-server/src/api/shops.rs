//! Shop lookup and crowd-sourced amenity submissions.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use cuppa_core::{Actor, Shop};
use cuppa_db::RatingSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{CurrentActor, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ShopDetail {
    #[serde(flatten)]
    shop: Shop,
    ratings: RatingSummary,
}

#[derive(Debug, Serialize)]
pub(super) struct SubmissionAck {
    shop_id: Uuid,
    submitted_by: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct WifiSubmission {
    available: bool,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChargerSubmission {
    available: bool,
    outlet_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PetsSubmission {
    pet_friendly: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct RatingSubmission {
    score: i16,
    comment: Option<String>,
}

fn parse_shop_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::new(req_id, "validation_error", "shop id must be a UUID"))
}

/// `require_actor` guarantees this on write routes.
fn actor_of(req_id: &str, current: CurrentActor) -> Result<Actor, ApiError> {
    current.0.ok_or_else(|| {
        ApiError::new(req_id, "unauthorized", "missing or invalid bearer token")
    })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn ack(req_id: RequestId, shop_id: Uuid, actor: Actor) -> Json<ApiResponse<SubmissionAck>> {
    Json(ApiResponse::new(
        req_id.0,
        SubmissionAck {
            shop_id,
            submitted_by: actor.id,
        },
    ))
}

pub(super) async fn get_shop(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ShopDetail>>, ApiError> {
    let shop_id = parse_shop_id(&req_id.0, &id)?;

    let row = cuppa_db::get_shop_by_public_id(&state.pool, shop_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &cuppa_db::DbError::from(e)))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "shop not found"))?;
    let ratings = cuppa_db::get_rating_summary(&state.pool, shop_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        ShopDetail {
            shop: row.into_shop(),
            ratings,
        },
    )))
}

pub(super) async fn submit_wifi(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(current): Extension<CurrentActor>,
    Path(id): Path<String>,
    Json(body): Json<WifiSubmission>,
) -> Result<Json<ApiResponse<SubmissionAck>>, ApiError> {
    let shop_id = parse_shop_id(&req_id.0, &id)?;
    let actor = actor_of(&req_id.0, current)?;

    cuppa_db::upsert_wifi_detail(
        &state.pool,
        shop_id,
        &actor,
        body.available,
        non_blank(body.detail.as_deref()),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ack(req_id, shop_id, actor))
}

pub(super) async fn submit_charger(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(current): Extension<CurrentActor>,
    Path(id): Path<String>,
    Json(body): Json<ChargerSubmission>,
) -> Result<Json<ApiResponse<SubmissionAck>>, ApiError> {
    let shop_id = parse_shop_id(&req_id.0, &id)?;
    let actor = actor_of(&req_id.0, current)?;
    if body.outlet_count.is_some_and(|n| n < 0) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "outlet_count must not be negative",
        ));
    }

    cuppa_db::upsert_charger_detail(
        &state.pool,
        shop_id,
        &actor,
        body.available,
        body.outlet_count,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ack(req_id, shop_id, actor))
}

pub(super) async fn submit_pets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(current): Extension<CurrentActor>,
    Path(id): Path<String>,
    Json(body): Json<PetsSubmission>,
) -> Result<Json<ApiResponse<SubmissionAck>>, ApiError> {
    let shop_id = parse_shop_id(&req_id.0, &id)?;
    let actor = actor_of(&req_id.0, current)?;

    cuppa_db::set_pet_friendly(&state.pool, shop_id, &actor, body.pet_friendly)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ack(req_id, shop_id, actor))
}

pub(super) async fn submit_rating(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(current): Extension<CurrentActor>,
    Path(id): Path<String>,
    Json(body): Json<RatingSubmission>,
) -> Result<Json<ApiResponse<SubmissionAck>>, ApiError> {
    let shop_id = parse_shop_id(&req_id.0, &id)?;
    let actor = actor_of(&req_id.0, current)?;
    if !(1..=5).contains(&body.score) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("score must be between 1 and 5, got {}", body.score),
        ));
    }

    cuppa_db::upsert_rating(
        &state.pool,
        shop_id,
        &actor,
        body.score,
        non_blank(body.comment.as_deref()),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ack(req_id, shop_id, actor))
}
