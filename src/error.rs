//! HTTP error responses

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ModelError;
use crate::pipeline::{PipelineHalt, CITY_SUGGESTION};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upload exceeds the body limit (413)
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// JSON body missing, malformed or of the wrong shape
    #[error(transparent)]
    InvalidJson(#[from] JsonRejection),

    /// Input the user has to supply before the pipeline can go on (422)
    #[error(transparent)]
    Halt(#[from] PipelineHalt),

    /// Captioning failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": { "code": "BAD_REQUEST", "message": msg } }),
            ),
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": { "code": "PAYLOAD_TOO_LARGE", "message": msg } }),
            ),
            ApiError::InvalidJson(rejection) => (
                rejection.status(),
                json!({ "error": { "code": "INVALID_BODY", "message": rejection.body_text() } }),
            ),
            ApiError::Halt(halt) => {
                let mut body = json!({ "halt": halt, "message": halt.to_string() });
                if halt == PipelineHalt::CityRequired {
                    body["suggestion"] = json!(CITY_SUGGESTION);
                }
                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            ApiError::Model(ModelError::Image(msg)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": { "code": "INVALID_IMAGE", "message": msg } }),
            ),
            ApiError::Model(err) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": { "code": "MODEL_ERROR", "message": err.to_string() } }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
