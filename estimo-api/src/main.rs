use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use estimo_ai::Estimator;
use estimo_api::{app, app_config::Config, AppState};
use estimo_catalog::PricingCatalog;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estimo_api=debug,estimo_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Estimo API on port {}", config.server.port);

    // Pricing tables are fixed for the life of the process
    let catalog = Arc::new(PricingCatalog::standard());
    let estimator = Estimator::from_settings(catalog.clone(), &config.ai)
        .context("Failed to create model service client")?;

    let app = app(AppState::new(catalog, estimator));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
