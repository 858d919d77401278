//! Named-entity recognition
//!
//! Entities use spaCy-style labels. Only `GPE` and `LOC` count as places.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::gemini::GeminiClient;
use super::ModelError;

const NER_PROMPT: &str = "Extract the named entities from the text below, in the order they \
appear. Answer with a JSON array of objects with the fields \"text\" (the exact span from the \
text) and \"label\" (one of GPE, LOC, FAC, ORG, PERSON, NORP, EVENT, WORK_OF_ART, OTHER). \
Use GPE for countries, cities and states, LOC for other geographic locations. \
Answer with [] when there are none.\n\nText: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
}

impl Entity {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }

    /// Geopolitical entity or location.
    pub fn is_place(&self) -> bool {
        self.label.eq_ignore_ascii_case("GPE") || self.label.eq_ignore_ascii_case("LOC")
    }
}

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    /// Entities of `text` in document order.
    async fn entities(&self, text: &str) -> Result<Vec<Entity>, ModelError>;
}

pub struct GeminiRecognizer {
    client: GeminiClient,
}

impl GeminiRecognizer {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EntityRecognizer for GeminiRecognizer {
    async fn entities(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        let parts = vec![json!({ "text": format!("{NER_PROMPT}{text}") })];
        let raw = self.client.generate(parts, true).await?;
        let entities = parse_entities(&raw)?;
        debug!(count = entities.len(), "Recognized entities");
        Ok(entities)
    }
}

/// Parse the model's JSON answer, tolerating a markdown code fence around it.
pub fn parse_entities(raw: &str) -> Result<Vec<Entity>, ModelError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let entities: Vec<Entity> =
        serde_json::from_str(body).map_err(|e| ModelError::Parse(e.to_string()))?;

    Ok(entities
        .into_iter()
        .filter(|e| !e.text.trim().is_empty())
        .collect())
}
