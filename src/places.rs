//! Nearby tourist attractions from the Google Maps geocoding and places APIs

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const NO_ATTRACTIONS: &str = "No attractions found";
pub const SEARCH_RADIUS_M: u32 = 2000;
pub const PLACE_TYPE: &str = "tourist_attraction";
pub const MAX_ATTRACTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("No geocoding result for {0}")]
    LocationNotFound(String),

    #[error("No attractions near {0}")]
    NoAttractions(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl PlacesError {
    /// Sentinel shown in place of the attraction list.
    pub fn sentinel(&self) -> &'static str {
        match self {
            PlacesError::NoAttractions(_) => NO_ATTRACTIONS,
            _ => LOCATION_NOT_FOUND,
        }
    }
}

/// Collapse a lookup result into the list to display.
pub fn names_or_sentinel(result: Result<Vec<String>, PlacesError>) -> Vec<String> {
    result.unwrap_or_else(|e| vec![e.sentinel().to_string()])
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    name: String,
}

pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: crate::config::GOOGLE_MAPS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Up to five attraction names within 2 km of `city`.
    pub async fn nearby_attractions(
        &self,
        city: &str,
        api_key: &str,
    ) -> Result<Vec<String>, PlacesError> {
        let coords = self.geocode(city, api_key).await?;
        debug!(city = %city, lat = coords.lat, lng = coords.lng, "Geocoded city");

        let location = format!("{},{}", coords.lat, coords.lng);
        let radius = SEARCH_RADIUS_M.to_string();
        let response: NearbyResponse = self
            .get_json(
                "maps/api/place/nearbysearch/json",
                &[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", PLACE_TYPE),
                    ("key", api_key),
                ],
            )
            .await?;

        let names: Vec<String> = response
            .results
            .into_iter()
            .take(MAX_ATTRACTIONS)
            .map(|p| p.name)
            .collect();

        if names.is_empty() {
            return Err(PlacesError::NoAttractions(city.to_string()));
        }

        info!(city = %city, count = names.len(), "Fetched nearby attractions");
        Ok(names)
    }

    pub async fn geocode(&self, city: &str, api_key: &str) -> Result<Coordinates, PlacesError> {
        let response: GeocodeResponse = self
            .get_json(
                "maps/api/geocode/json",
                &[("address", city), ("key", api_key)],
            )
            .await?;

        response
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| PlacesError::LocationNotFound(city.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlacesError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        self.http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| PlacesError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| PlacesError::Parse(e.to_string()))
    }
}
