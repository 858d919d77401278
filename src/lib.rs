//! Travel companion: landmark photo → caption → city → summary, weather
//! and nearby attractions.

pub mod api;
pub mod config;
pub mod encyclopedia;
pub mod error;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod places;
pub mod weather;

pub use crate::error::{ApiError, ApiResult};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::pipeline::Pipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(
            "/caption",
            post(api::caption_image).layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES)),
        )
        .route("/resolve", post(api::resolve_city))
        .route("/explore", post(api::explore))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
