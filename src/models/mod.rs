//! Process-wide model handles
//!
//! The captioning and NER models are set up once and only read afterwards,
//! so the handles are shared across requests without locking.

pub mod caption;
pub mod gemini;
pub mod ner;

use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::info;

pub use caption::{GeminiCaptioner, ImageCaptioner};
pub use gemini::GeminiClient;
pub use ner::{Entity, EntityRecognizer, GeminiRecognizer};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Image decode error: {0}")]
    Image(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model returned no output")]
    EmptyResponse,
}

static MODELS: OnceLock<Models> = OnceLock::new();

#[derive(Clone)]
pub struct Models {
    pub captioner: Arc<dyn ImageCaptioner>,
    pub recognizer: Arc<dyn EntityRecognizer>,
}

impl Models {
    pub fn new(captioner: Arc<dyn ImageCaptioner>, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            captioner,
            recognizer,
        }
    }

    pub fn gemini(client: GeminiClient) -> Self {
        Self::new(
            Arc::new(GeminiCaptioner::new(client.clone())),
            Arc::new(GeminiRecognizer::new(client)),
        )
    }

    /// Process-wide models, initialized from `config` on first use.
    /// Later calls return the same instance and ignore `config`.
    pub fn global(config: &Config, http: &reqwest::Client) -> &'static Models {
        MODELS.get_or_init(|| {
            info!(model = %config.gemini_model, "Initializing models");
            let client = GeminiClient::new(
                http.clone(),
                config.gemini_api_key.clone(),
                config.gemini_model.clone(),
            )
            .with_base_url(config.endpoints.gemini.clone());
            Self::gemini(client)
        })
    }
}
