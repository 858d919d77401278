//! Caption to city resolution
//!
//! Tiers, first hit wins:
//! 1. ordered keyword table (case-insensitive substring)
//! 2. first `GPE`/`LOC` entity in the caption
//! 3. free-form geocoding of the whole caption
//! 4. `Unknown`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::EntityRecognizer;

pub const UNKNOWN_CITY: &str = "Unknown";

/// Landmark and city keywords, checked in this order.
pub const KEYWORD_TABLE: &[(&str, &str)] = &[
    ("statue of liberty", "New York"),
    ("eiffel tower", "Paris"),
    ("taj mahal", "Agra"),
    ("big ben", "London"),
    ("colosseum", "Rome"),
    ("christ the redeemer", "Rio de Janeiro"),
    ("sydney opera house", "Sydney"),
    ("burj khalifa", "Dubai"),
    ("gateway of india", "Mumbai"),
    ("denver", "Denver"),
    ("new york", "New York"),
    ("paris", "Paris"),
    ("tokyo", "Tokyo"),
    ("rome", "Rome"),
    ("london", "London"),
    ("sydney", "Sydney"),
    ("rio de janeiro", "Rio de Janeiro"),
    ("chicago", "Chicago"),
    ("washington", "Washington D.C."),
    ("boston", "Boston"),
    ("seattle", "Seattle"),
];

/// First table city whose keyword occurs in `caption`.
pub fn match_keyword(caption: &str) -> Option<&'static str> {
    let lower = caption.to_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, city)| *city)
}

/// Which tier produced the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Keyword,
    Entity,
    Geocoder,
    /// Entered by the user.
    User,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub city: String,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn new(city: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            city: city.into(),
            source,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_CITY, ResolutionSource::Unresolved)
    }

    pub fn is_unknown(&self) -> bool {
        self.source == ResolutionSource::Unresolved
    }
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Geocoder API error {0}")]
    Api(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Full address of the best match for a free-form query, if any.
    async fn lookup(&self, query: &str) -> Result<Option<String>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
}

/// OpenStreetMap Nominatim search.
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: crate::config::NOMINATIM_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        debug!(query = %query, "Geocoding caption");

        let response = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Api(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        Ok(places.into_iter().next().map(|p| p.display_name))
    }
}

/// Most specific locality of a geocoded address.
fn first_segment(address: &str) -> Option<&str> {
    address
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub struct LocationResolver {
    recognizer: Arc<dyn EntityRecognizer>,
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            recognizer,
            geocoder,
        }
    }

    /// Best-guess city for `caption`. Never fails; degrades to [`UNKNOWN_CITY`].
    pub async fn resolve(&self, caption: &str) -> Resolution {
        if let Some(city) = match_keyword(caption) {
            info!(city = %city, "Resolved city from keyword table");
            return Resolution::new(city, ResolutionSource::Keyword);
        }

        match self.recognizer.entities(caption).await {
            Ok(entities) => {
                if let Some(entity) = entities.into_iter().find(|e| e.is_place()) {
                    let city = entity.text.trim().to_string();
                    info!(city = %city, label = %entity.label, "Resolved city from named entity");
                    return Resolution::new(city, ResolutionSource::Entity);
                }
            }
            Err(e) => warn!(error = %e, "Entity recognition failed"),
        }

        // The caption is sent as-is, descriptive words included.
        match self.geocoder.lookup(caption).await {
            Ok(Some(address)) => {
                if let Some(city) = first_segment(&address) {
                    info!(city = %city, address = %address, "Resolved city from geocoder");
                    return Resolution::new(city, ResolutionSource::Geocoder);
                }
            }
            Ok(None) => debug!("Geocoder found no match"),
            Err(e) => warn!(error = %e, "Geocoding failed"),
        }

        info!("Could not resolve a city from the caption");
        Resolution::unknown()
    }
}
