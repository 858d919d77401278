//! Caption → city → summary, weather and attractions
//!
//! Steps run one after another. Only captioning errors reach the caller;
//! every lookup degrades to its sentinel and logs the cause.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, Credentials};
use crate::encyclopedia::{EncyclopediaClient, NO_SUMMARY};
use crate::location::{LocationResolver, NominatimGeocoder, Resolution, ResolutionSource};
use crate::models::{ImageCaptioner, ModelError, Models};
use crate::places::{self, PlacesClient};
use crate::weather::{WeatherClient, WeatherReport};

pub const WEATHER_KEY_MISSING: &str = "Weather API key not set.";
pub const PLACES_KEY_MISSING: &str = "Google Places API key not set.";
pub const CITY_SUGGESTION: &str = "e.g. Denver, Paris, Tokyo";

/// Reasons the pipeline stops and asks the user for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineHalt {
    #[error("Please enter a landmark name to continue.")]
    CaptionRequired,

    #[error("We couldn't auto-detect a city. City is required to fetch weather and attractions.")]
    CityRequired,
}

/// Non-empty, trimmed caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption(String);

impl Caption {
    pub fn parse(raw: &str) -> Result<Self, PipelineHalt> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineHalt::CaptionRequired);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Non-empty, trimmed city name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    pub fn parse(raw: &str) -> Result<Self, PipelineHalt> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PipelineHalt::CityRequired);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A report section that is either filled in or skipped with a warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Available(T),
    Skipped { warning: String },
}

impl<T> Section<T> {
    pub fn skipped(warning: &str) -> Self {
        Section::Skipped {
            warning: warning.to_string(),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Section::Available(value) => Some(value),
            Section::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreReport {
    pub caption: String,
    pub city: String,
    pub city_source: ResolutionSource,
    pub summary: String,
    pub weather: Section<WeatherReport>,
    pub attractions: Section<Vec<String>>,
    pub warnings: Vec<String>,
}

pub struct Pipeline {
    captioner: Arc<dyn ImageCaptioner>,
    resolver: LocationResolver,
    encyclopedia: EncyclopediaClient,
    weather: WeatherClient,
    places: PlacesClient,
    credentials: Credentials,
}

impl Pipeline {
    pub fn new(
        captioner: Arc<dyn ImageCaptioner>,
        resolver: LocationResolver,
        encyclopedia: EncyclopediaClient,
        weather: WeatherClient,
        places: PlacesClient,
        credentials: Credentials,
    ) -> Self {
        Self {
            captioner,
            resolver,
            encyclopedia,
            weather,
            places,
            credentials,
        }
    }

    /// Wire every step to the configured services, reusing `models`.
    pub fn from_config(config: &Config, http: reqwest::Client, models: &Models) -> Self {
        let endpoints = &config.endpoints;
        let geocoder =
            NominatimGeocoder::new(http.clone()).with_base_url(endpoints.nominatim.clone());

        Self::new(
            models.captioner.clone(),
            LocationResolver::new(models.recognizer.clone(), Arc::new(geocoder)),
            EncyclopediaClient::new(http.clone()).with_base_url(endpoints.wikipedia.clone()),
            WeatherClient::new(http.clone()).with_base_url(endpoints.openweather.clone()),
            PlacesClient::new(http).with_base_url(endpoints.google_maps.clone()),
            config.credentials.clone(),
        )
    }

    pub fn model_name(&self) -> &str {
        self.captioner.name()
    }

    /// Caption an uploaded image. Errors propagate.
    pub async fn caption(&self, image: &[u8]) -> Result<String, ModelError> {
        self.captioner.caption(image).await
    }

    pub async fn resolve(&self, caption: &Caption) -> Resolution {
        self.resolver.resolve(caption.as_str()).await
    }

    /// Run everything after captioning.
    ///
    /// A non-blank `city_override` replaces resolution entirely. Without it,
    /// an unresolved city halts the pipeline before any lookup.
    pub async fn explore(
        &self,
        caption: &str,
        city_override: Option<&str>,
    ) -> Result<ExploreReport, PipelineHalt> {
        let caption = Caption::parse(caption)?;

        let override_city = city_override.and_then(|c| CityName::parse(c).ok());
        let (city, city_source) = match override_city {
            Some(city) => (city, ResolutionSource::User),
            None => {
                let resolution = self.resolve(&caption).await;
                if resolution.is_unknown() {
                    return Err(PipelineHalt::CityRequired);
                }
                (CityName::parse(&resolution.city)?, resolution.source)
            }
        };

        info!(caption = %caption.as_str(), city = %city.as_str(), "Exploring");

        let summary = self.summary(&caption).await;
        let mut warnings = Vec::new();

        let weather = match self.credentials.weather.as_deref() {
            Some(key) => Section::Available(self.weather(&city, key).await),
            None => {
                warnings.push(WEATHER_KEY_MISSING.to_string());
                Section::skipped(WEATHER_KEY_MISSING)
            }
        };

        let attractions = match self.credentials.places.as_deref() {
            Some(key) => Section::Available(self.attractions(&city, key).await),
            None => {
                warnings.push(PLACES_KEY_MISSING.to_string());
                Section::skipped(PLACES_KEY_MISSING)
            }
        };

        Ok(ExploreReport {
            caption: caption.as_str().to_string(),
            city: city.as_str().to_string(),
            city_source,
            summary,
            weather,
            attractions,
            warnings,
        })
    }

    async fn summary(&self, caption: &Caption) -> String {
        self.encyclopedia
            .summary(caption.as_str())
            .await
            .unwrap_or_else(|e| {
                warn!(subject = %caption.as_str(), error = %e, "Summary lookup failed");
                NO_SUMMARY.to_string()
            })
    }

    async fn weather(&self, city: &CityName, key: &str) -> WeatherReport {
        let result = self.weather.current(city.as_str(), key).await;
        if let Err(e) = &result {
            warn!(city = %city.as_str(), error = %e, "Weather lookup failed");
        }
        WeatherReport::or_unavailable(result)
    }

    async fn attractions(&self, city: &CityName, key: &str) -> Vec<String> {
        let result = self.places.nearby_attractions(city.as_str(), key).await;
        if let Err(e) = &result {
            warn!(city = %city.as_str(), error = %e, "Places lookup failed");
        }
        places::names_or_sentinel(result)
    }
}
