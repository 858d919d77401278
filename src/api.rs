//! HTTP handlers

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult};
use crate::location::ResolutionSource;
use crate::pipeline::{Caption, ExploreReport};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub caption: String,
    pub model: String,
    pub processing_time_ms: u128,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub caption: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub city: String,
    pub source: ResolutionSource,
}

#[derive(Debug, Deserialize)]
pub struct ExploreRequest {
    pub caption: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// POST /caption
pub async fn caption_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<CaptionResponse>> {
    let start = Instant::now();

    let field = multipart
        .next_field()
        .await?
        .ok_or_else(|| ApiError::BadRequest("No image uploaded".to_string()))?;

    let data = field.bytes().await?;

    if data.is_empty() {
        return Err(ApiError::BadRequest("Uploaded image is empty".to_string()));
    }

    let caption = state.pipeline.caption(&data).await.map_err(|e| {
        error!(error = %e, "Caption error");
        ApiError::from(e)
    })?;

    let elapsed = start.elapsed().as_millis();
    info!(elapsed_ms = elapsed as u64, "Captioned upload");

    Ok(Json(CaptionResponse {
        caption,
        model: state.pipeline.model_name().to_string(),
        processing_time_ms: elapsed,
    }))
}

/// POST /resolve
pub async fn resolve_city(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> ApiResult<Json<ResolveResponse>> {
    let Json(request) = payload?;
    let caption = Caption::parse(&request.caption)?;
    let resolution = state.pipeline.resolve(&caption).await;

    Ok(Json(ResolveResponse {
        city: resolution.city,
        source: resolution.source,
    }))
}

/// POST /explore
pub async fn explore(
    State(state): State<AppState>,
    payload: Result<Json<ExploreRequest>, JsonRejection>,
) -> ApiResult<Json<ExploreReport>> {
    let Json(request) = payload?;
    let report = state
        .pipeline
        .explore(&request.caption, request.city.as_deref())
        .await?;
    Ok(Json(report))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
