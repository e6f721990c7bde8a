use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use smartskin::api::server::start_server;
use smartskin::api::types::AppContext;
use smartskin::config::{self, Config};
use smartskin::db::open_database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Smart Skin Health backend starting v{}", config::APP_VERSION);

    let config = Arc::new(Config::from_env()?);

    std::fs::create_dir_all(&config.reports_dir)?;
    let db = open_database(&config.database_path)?;

    if config.twilio.is_none() {
        tracing::warn!("messaging credentials not set; report delivery is disabled");
    }

    let port = config.port;
    let ctx = AppContext::new(config, db);
    let mut handle = start_server(ctx, port).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown();

    Ok(())
}
