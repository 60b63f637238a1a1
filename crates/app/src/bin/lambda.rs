//! Chatvault API - AWS Lambda Runtime

use lambda_http::{run, Error};
use tracing::info;

use chatvault_app::{create_app, with_http_layers};
use chatvault_common::config::Config;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Chatvault API Lambda");

    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let app = create_app(&config)
        .await
        .map_err(|e| Error::from(format!("App initialization error: {}", e)))?;

    let app = with_http_layers(app, &config.cors_origins());

    info!("Chatvault API Lambda ready to serve requests");

    run(app).await
}
