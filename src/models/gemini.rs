//! Google Gemini `generateContent` client shared by the captioner and the
//! entity recognizer.

use serde_json::{json, Value};
use tracing::debug;

use super::ModelError;

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: crate::config::GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one user turn made of `parts` and return the first candidate's text.
    ///
    /// With `json_output` the model is asked to answer with `application/json`.
    pub async fn generate(&self, parts: Vec<Value>, json_output: bool) -> Result<String, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let mut payload = json!({
            "contents": [{ "parts": parts }]
        });
        if json_output {
            payload["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        debug!(model = %self.model, "Sending request to Gemini");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let preview: String = body.chars().take(500).collect();
        debug!(status = status.as_u16(), body = %preview, "Gemini response");

        if !status.is_success() {
            return Err(ModelError::Api(status.as_u16(), body));
        }

        let result: Value =
            serde_json::from_str(&body).map_err(|e| ModelError::Parse(e.to_string()))?;

        let text = result["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(ModelError::EmptyResponse)?
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(ModelError::EmptyResponse);
        }

        Ok(text)
    }
}
