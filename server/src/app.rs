use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    extract::Request,
    http::{
        header::{CONTENT_TYPE, RETRY_AFTER},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::handlers::{analyze_and_generate, health_check, metrics_endpoint};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Handlers enforce `request_timeout` themselves and answer with a JSON 504; the
/// layer only catches what outlives that.
const TIMEOUT_LAYER_GRACE: Duration = Duration::from_secs(5);

/// Assemble the full application: routes (also mounted under `/api`) plus the
/// tracing, rate-limit, timeout and CORS middleware.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let config = &state.config;

    // All clients share one bucket; per-IP keys are unreliable behind proxies.
    let rate = u64::from(config.rate_limit_per_minute.max(1));
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond((60_000 / rate).max(1))
            .burst_size(rate as u32)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .context("invalid rate limit configuration")?,
    );
    info!("Rate limiting: {} requests per minute", rate);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(config.request_timeout() + TIMEOUT_LAYER_GRACE))
        .layer(cors_layer(config))
        .into_inner();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/analyze-and-generate", post(analyze_and_generate));

    Ok(Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .layer(axum::middleware::from_fn(rate_limit_as_json))
        .with_state(state))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let Some(allowed_origins) = &config.cors_allowed_origins else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        return base.allow_origin(Any);
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        base.allow_origin(Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(AllowOrigin::list(origins))
    }
}

/// Tag request and response with a fresh id so log lines can be correlated.
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&request_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }
    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// The rate limiter answers in plain text; rewrite its rejections into the JSON error shape.
async fn rate_limit_as_json(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if response.status() != StatusCode::TOO_MANY_REQUESTS || is_json {
        return response;
    }

    let mut json = ApiError::RateLimitExceeded.into_response();
    for (name, value) in response.headers() {
        if name == RETRY_AFTER || name.as_str().starts_with("x-ratelimit") {
            json.headers_mut().insert(name.clone(), value.clone());
        }
    }
    json
}
