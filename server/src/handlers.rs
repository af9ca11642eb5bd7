use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::{analyze_speech, Analysis};
use crate::error::ApiError;
use crate::images::{generate_images, ImageResult};
use crate::metrics::MetricsResponse;
use crate::state::AppState;
use crate::validation::validate_speech_text;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub speech_text: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub analyzed_points: Analysis,
    pub images: Vec<ImageResult>,
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(state.metrics.snapshot())
}

pub async fn analyze_and_generate(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let start_time = Instant::now();

    let result = match payload {
        Ok(Json(req)) => {
            let request_timeout = state.config.request_timeout();
            tokio::time::timeout(request_timeout, run_pipeline(&state, &req.speech_text))
                .await
                .unwrap_or_else(|_| {
                    Err(ApiError::Timeout {
                        stage: "request",
                        secs: request_timeout.as_secs(),
                    })
                })
        }
        Err(rejection) => Err(ApiError::InvalidInput(rejection.body_text())),
    };

    let latency_ms = start_time.elapsed().as_millis() as u64;
    state.metrics.analyze.record_request(latency_ms);
    if result.is_err() {
        state.metrics.analyze.record_error();
    }

    result.map(Json)
}

/// Analyze, then illustrate. A sentinel analysis skips image generation entirely.
async fn run_pipeline(state: &AppState, speech_text: &str) -> Result<AnalyzeResponse, ApiError> {
    validate_speech_text(speech_text)?;

    let timeout = state.config.llm_timeout();
    let analysis = analyze_speech(state.chat.as_ref(), speech_text, timeout).await?;

    let images = match &analysis {
        Analysis::Points(points) => {
            let images = generate_images(state.images.as_ref(), points, timeout).await;
            state.metrics.pipeline.record_images(points.len(), images.len());
            images
        }
        Analysis::Failed(reason) => {
            warn!(%reason, "analysis failed, skipping image generation");
            state.metrics.pipeline.record_sentinel();
            Vec::new()
        }
    };

    info!(images = images.len(), "analyze-and-generate complete");
    Ok(AnalyzeResponse {
        analyzed_points: analysis,
        images,
    })
}
