mod proxy;
mod search;
mod shops;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use cuppa_ai::FilterTranslator;
use cuppa_core::AppConfig;
use cuppa_places::PlacesClient;
use cuppa_search::{PgShopStore, SearchError, SearchPipeline};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    attach_actor, enforce_rate_limit, request_id, require_actor, AuthState, RateLimitState,
    RequestId,
};

pub type ShopSearch = SearchPipeline<FilterTranslator, PlacesClient, PgShopStore>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// `None` when an API key is missing; search answers `config_error`.
    pub search: Option<Arc<ShopSearch>>,
    /// `None` when the maps key is missing; the proxy answers `config_error`.
    pub places: Option<PlacesClient>,
}

impl AppState {
    /// Builds the search pipeline and proxy client from configuration.
    ///
    /// Missing API keys are logged and leave the affected routes answering
    /// `config_error`; other construction failures are returned.
    pub fn from_config(config: &AppConfig, pool: PgPool) -> Result<Self, SearchError> {
        let search = match ShopSearch::from_config(config, pool.clone()) {
            Ok(pipeline) => Some(Arc::new(pipeline)),
            Err(SearchError::Config(e)) => {
                tracing::warn!(error = %e, "search disabled");
                None
            }
            Err(e) => return Err(e),
        };

        let places = match config.maps_api_key.as_deref() {
            Some(key) => Some(PlacesClient::with_base_url(
                key,
                config.http_timeout_secs,
                &config.places_base_url,
            )?),
            None => {
                tracing::warn!("CUPPA_MAPS_API_KEY not set; maps proxy disabled");
                None
            }
        };

        Ok(Self {
            pool,
            search,
            places,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" | "ai_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &cuppa_db::DbError) -> ApiError {
    if matches!(error, cuppa_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "shop not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    let code = match error {
        SearchError::Config(_) => "config_error",
        SearchError::Ai(_) => "ai_error",
        SearchError::Places(_) => "upstream_error",
    };
    tracing::warn!(error = %error, code, "search failed");
    ApiError::new(request_id, code, error.user_message())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn rate_limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/search", post(search::search))
        .route("/api/v1/shops/{id}", get(shops::get_shop))
        .route("/maps-api/{*path}", get(proxy::forward))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn write_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/shops/{id}/wifi", put(shops::submit_wifi))
        .route("/api/v1/shops/{id}/charger", put(shops::submit_charger))
        .route("/api/v1/shops/{id}/pets", put(shops::submit_pets))
        .route("/api/v1/shops/{id}/rating", put(shops::submit_rating))
        .layer(axum::middleware::from_fn(require_actor))
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));
    let actor_routes = Router::new()
        .merge(rate_limited_router(rate_limit))
        .merge(write_router())
        .layer(axum::middleware::from_fn_with_state(auth, attach_actor));

    Router::new()
        .merge(public_routes)
        .merge(actor_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match cuppa_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests;
