//! Current weather from OpenWeatherMap

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

pub const UNAVAILABLE_DESCRIPTION: &str = "Weather data unavailable";
pub const UNAVAILABLE_TEMPERATURE: &str = "N/A";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Response is missing the \"{0}\" field")]
    MissingField(&'static str),
}

/// Degrees Celsius, or the placeholder when unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    Celsius(f64),
    Unavailable,
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Temperature::Celsius(t) => serializer.serialize_f64(*t),
            Temperature::Unavailable => serializer.serialize_str(UNAVAILABLE_TEMPERATURE),
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(t) => write!(f, "{t}°C"),
            Temperature::Unavailable => f.write_str(UNAVAILABLE_TEMPERATURE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub description: String,
    pub temperature: Temperature,
}

impl WeatherReport {
    pub fn unavailable() -> Self {
        Self {
            description: UNAVAILABLE_DESCRIPTION.to_string(),
            temperature: Temperature::Unavailable,
        }
    }

    /// Collapse a lookup result into a displayable report.
    pub fn or_unavailable(result: Result<Self, WeatherError>) -> Self {
        result.unwrap_or_else(|_| Self::unavailable())
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.description, self.temperature)
    }
}

/// Read description and temperature, requiring both `weather` and `main`.
pub fn parse_report(data: &Value) -> Result<WeatherReport, WeatherError> {
    let weather = data.get("weather").ok_or(WeatherError::MissingField("weather"))?;
    let main = data.get("main").ok_or(WeatherError::MissingField("main"))?;

    let description = weather[0]["description"]
        .as_str()
        .ok_or(WeatherError::MissingField("weather[0].description"))?
        .to_string();
    let temperature = main["temp"]
        .as_f64()
        .ok_or(WeatherError::MissingField("main.temp"))?;

    Ok(WeatherReport {
        description,
        temperature: Temperature::Celsius(temperature),
    })
}

pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: crate::config::OPENWEATHER_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn current(&self, city: &str, api_key: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        debug!(city = %city, "Querying OpenWeatherMap");

        // Error statuses still carry a JSON body; it simply lacks the fields.
        let data: Value = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        let report = parse_report(&data)?;
        info!(city = %city, report = %report, "Fetched weather");
        Ok(report)
    }
}
