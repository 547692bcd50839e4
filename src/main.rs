//! XMonitor — Binary Entrypoint
//! Boots the Axum HTTP server, wiring configuration, collaborators, and
//! the ingestion pipeline.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xmonitor::api::{self, AppState};
use xmonitor::classify::Analyzer;
use xmonitor::config::AppConfig;
use xmonitor::notify::TelegramNotifier;
use xmonitor::pipeline::Pipeline;
use xmonitor::store::{MemoryPostStore, MemoryProjectDirectory};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env()?;

    let analyzer = Analyzer::from_config(&config.ai);
    info!(backend = analyzer.backend_name(), "classification backend selected");

    let notifier = TelegramNotifier::from_config(&config.telegram);
    if notifier.is_configured() {
        // One-off smoke test; a failure is logged, not fatal.
        if !notifier.test_connection().await {
            warn!("Telegram connectivity test failed; alerts may not deliver");
        }
    } else {
        warn!("Telegram not configured; alerts will be dropped");
    }

    let pipeline = Pipeline::new(
        Arc::new(MemoryProjectDirectory::new()),
        Arc::new(MemoryPostStore::new()),
        analyzer,
        Arc::new(notifier),
        config.webhook_secret.clone(),
    );
    let router = api::router(AppState {
        pipeline: Arc::new(pipeline),
    });

    let addr = format!("0.0.0.0:{}", config.port);
    info!(%addr, "starting XMonitor service");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
