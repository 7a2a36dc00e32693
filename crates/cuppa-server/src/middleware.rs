use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use cuppa_core::Actor;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The authenticated caller, if the request carried a valid bearer token.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Option<Actor>);

/// Bearer-token settings used by the actor middleware.
///
/// Only SHA-256 digests of the configured tokens are kept in memory. Actor
/// ids come from [`Actor::from_token`].
#[derive(Debug, Clone)]
pub struct AuthState {
    token_digests: Arc<Vec<[u8; 32]>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from `CUPPA_API_KEYS` (comma-separated bearer tokens).
    ///
    /// In development, empty/missing keys accept any bearer token so writes
    /// can be exercised locally. In non-development envs, empty/missing keys
    /// fail startup.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("CUPPA_API_KEYS").unwrap_or_default();
        Self::from_keys(raw.split(','), is_development)
    }

    pub fn from_keys<'a>(
        keys: impl IntoIterator<Item = &'a str>,
        is_development: bool,
    ) -> anyhow::Result<Self> {
        let digests: Vec<[u8; 32]> = keys
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|token| Sha256::digest(token.as_bytes()).into())
            .collect();

        if digests.is_empty() {
            if is_development {
                tracing::warn!(
                    "CUPPA_API_KEYS not set; any bearer token is accepted in development"
                );
                return Ok(Self {
                    token_digests: Arc::new(Vec::new()),
                    enabled: false,
                });
            }

            anyhow::bail!(
                "CUPPA_API_KEYS is required outside development; provide comma-separated bearer tokens"
            );
        }

        Ok(Self {
            token_digests: Arc::new(digests),
            enabled: true,
        })
    }

    /// The actor for `token`, or `None` if the token is not accepted.
    fn resolve(&self, token: &str) -> Option<Actor> {
        let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();

        if self.enabled {
            let matched = self
                .token_digests
                .iter()
                .fold(Choice::from(0), |acc, known| {
                    acc | known.as_slice().ct_eq(digest.as_slice())
                });
            if !bool::from(matched) {
                return None;
            }
        }

        Some(Actor::from_token(token))
    }
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter with one window per client.
///
/// Clients are keyed by actor id when authenticated, otherwise by peer
/// address. Expired windows are pruned as requests arrive.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, RateLimitWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts one request for `client`. Returns `false` once the client's
    /// window is exhausted.
    async fn admit(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        clients.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let window = clients
            .entry(client.to_string())
            .or_insert(RateLimitWindow {
                started_at: now,
                count: 0,
            });
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }
}

fn rate_limit_key(req: &Request) -> String {
    if let Some(CurrentActor(Some(actor))) = req.extensions().get::<CurrentActor>() {
        return format!("actor:{}", actor.id);
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(
            || "peer:unknown".to_string(),
            |ConnectInfo(addr)| format!("peer:{}", addr.ip()),
        )
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Resolves the bearer token, if any, into a [`CurrentActor`] extension.
///
/// Requests without a token continue anonymously; a token that is present
/// but not accepted is rejected.
pub async fn attach_actor(State(auth): State<AuthState>, mut req: Request, next: Next) -> Response {
    let actor = match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        None => None,
        Some(token) => match auth.resolve(token) {
            Some(actor) => Some(actor),
            None => {
                return ApiError::new(
                    request_id_of(&req),
                    "unauthorized",
                    "missing or invalid bearer token",
                )
                .into_response();
            }
        },
    };

    req.extensions_mut().insert(CurrentActor(actor));
    next.run(req).await
}

/// Rejects requests that [`attach_actor`] did not authenticate.
pub async fn require_actor(req: Request, next: Next) -> Response {
    let authenticated = matches!(
        req.extensions().get::<CurrentActor>(),
        Some(CurrentActor(Some(_)))
    );
    if !authenticated {
        return ApiError::new(
            request_id_of(&req),
            "unauthorized",
            "missing or invalid bearer token",
        )
        .into_response();
    }
    next.run(req).await
}

/// Middleware enforcing a fixed request-per-window limit per client.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = rate_limit_key(&req);
    if !rate_limit.admit(&client).await {
        tracing::warn!(client = %client, "rate limit exceeded");
        return ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
    }

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
