//! HTTP server for the absence rating engine.
//!
//! Reads the configuration directory from `ABSENCE_RATING_CONFIG` and the
//! bind address from `ABSENCE_RATING_ADDR`. Log filtering follows `RUST_LOG`.

use std::env;
use std::error::Error;

use absence_rating::api::{AppState, create_router};
use absence_rating::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()?;

    let config_dir =
        env::var("ABSENCE_RATING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = env::var("ABSENCE_RATING_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        deductible_days = config.rating().deductible_days,
        coverage_days = config.rating().coverage_days,
        "configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
