use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chopshop::config::Config;
use chopshop::http::{self, AppState};
use chopshop::metrics::Metrics;
use chopshop::store::{MemoryStore, Store};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chopshop=debug")),
        )
        .init();

    tracing::info!("🚀 Starting chopshop order backend");

    let config = Config::from_env();
    let metrics = Arc::new(Metrics::new()?);
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let state = web::Data::new(AppState::new(store, metrics.clone()));
    let metrics_data = web::Data::new(metrics);

    tracing::info!("📡 Listening on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(metrics_data.clone())
            .configure(http::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
