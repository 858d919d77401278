//! Runtime configuration
//!
//! Values come from the process environment after `.env` has been loaded.
//! Only the Gemini key is mandatory; the weather and places credentials are
//! optional and their absence is reported per request.

use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = "travel-companion";
/// Largest accepted photo upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const WIKIPEDIA_BASE_URL: &str = "https://en.wikipedia.org";
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const GOOGLE_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Base URLs of every external service, overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub gemini: String,
    pub nominatim: String,
    pub wikipedia: String,
    pub openweather: String,
    pub google_maps: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            gemini: GEMINI_BASE_URL.to_string(),
            nominatim: NOMINATIM_BASE_URL.to_string(),
            wikipedia: WIKIPEDIA_BASE_URL.to_string(),
            openweather: OPENWEATHER_BASE_URL.to_string(),
            google_maps: GOOGLE_MAPS_BASE_URL.to_string(),
        }
    }
}

/// Credentials for the optional lookups.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub weather: Option<String>,
    pub places: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub credentials: Credentials,
    pub http_timeout: Duration,
    pub endpoints: Endpoints,
}

impl Config {
    /// Load `.env` (if any) and read the configuration from the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let gemini_api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    key: "HTTP_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            gemini: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini),
            nominatim: get("NOMINATIM_BASE_URL").unwrap_or(defaults.nominatim),
            wikipedia: get("WIKIPEDIA_BASE_URL").unwrap_or(defaults.wikipedia),
            openweather: get("OPENWEATHER_BASE_URL").unwrap_or(defaults.openweather),
            google_maps: get("GOOGLE_MAPS_BASE_URL").unwrap_or(defaults.google_maps),
        };

        Ok(Self {
            bind_addr,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            credentials: Credentials {
                weather: get("OPENWEATHER_API_KEY").or_else(|| get("WEATHER_KEY")),
                places: get("GOOGLE_PLACES_API_KEY").or_else(|| get("GOOGLE_PLACES_KEY")),
            },
            http_timeout,
            endpoints,
        })
    }

    /// Shared HTTP client with the configured timeout.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        build_http_client(self.http_timeout)
    }
}

pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
