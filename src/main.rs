use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use travel_companion::config::Config;
use travel_companion::models::Models;
use travel_companion::pipeline::Pipeline;
use travel_companion::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    let http = config.http_client()?;

    let models = Models::global(&config, &http);
    let pipeline = Pipeline::from_config(&config, http, models);

    if config.credentials.weather.is_none() {
        info!("OPENWEATHER_API_KEY not set; weather will be skipped");
    }
    if config.credentials.places.is_none() {
        info!("GOOGLE_PLACES_API_KEY not set; attractions will be skipped");
    }

    let app = build_router(AppState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!(model = %config.gemini_model, "Server running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
