//! Wikipedia summaries via the MediaWiki action API

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const NO_SUMMARY: &str = "No information found.";
pub const SUMMARY_SENTENCES: u32 = 3;

#[derive(Debug, Error)]
pub enum EncyclopediaError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("\"{0}\" may refer to several pages")]
    Disambiguation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Wikipedia API error {0}")]
    Api(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: SearchQuery,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<String>,
}

pub struct EncyclopediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl EncyclopediaClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: crate::config::WIKIPEDIA_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.base_url.trim_end_matches('/'))
    }

    /// Up to three sentences about the best matching page for `subject`.
    pub async fn summary(&self, subject: &str) -> Result<String, EncyclopediaError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(EncyclopediaError::PageNotFound(String::new()));
        }

        let title = self.search(subject).await?;
        let page = self.extract(&title).await?;

        if page.missing {
            return Err(EncyclopediaError::PageNotFound(page.title));
        }
        if page.pageprops.and_then(|p| p.disambiguation).is_some() {
            return Err(EncyclopediaError::Disambiguation(page.title));
        }

        let summary = page.extract.unwrap_or_default().trim().to_string();
        if summary.is_empty() {
            return Err(EncyclopediaError::PageNotFound(page.title));
        }

        info!(title = %page.title, "Fetched Wikipedia summary");
        Ok(summary)
    }

    async fn search(&self, subject: &str) -> Result<String, EncyclopediaError> {
        debug!(subject = %subject, "Searching Wikipedia");
        let response: SearchResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", subject),
                ("srlimit", "1"),
                ("srprop", ""),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        response
            .query
            .search
            .into_iter()
            .next()
            .map(|hit| hit.title)
            .ok_or_else(|| EncyclopediaError::PageNotFound(subject.to_string()))
    }

    async fn extract(&self, title: &str) -> Result<Page, EncyclopediaError> {
        let sentences = SUMMARY_SENTENCES.to_string();
        let response: ExtractResponse = self
            .get_json(&[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .await?;

        response
            .query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| EncyclopediaError::PageNotFound(title.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, EncyclopediaError> {
        let response = self
            .http
            .get(self.api_url())
            .query(params)
            .send()
            .await
            .map_err(|e| EncyclopediaError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EncyclopediaError::Api(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| EncyclopediaError::Parse(e.to_string()))
    }
}
