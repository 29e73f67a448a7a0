//! Funnelboard — analytics backend for the mobile-app campaign dashboard.
//!
//! Loads the funnel dataset once, derives the row-level KPIs, and serves
//! every dashboard table over REST.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use funnel_api::ApiServer;
use funnel_core::config::AppConfig;
use funnel_dataset::DatasetStore;
use funnel_metrics::MetricsEngine;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "funnelboard")]
#[command(about = "Mobile-app campaign funnel analytics backend")]
#[command(version)]
struct Cli {
    /// Path to the funnel CSV (overrides config)
    #[arg(long, env = "FUNNELBOARD__DATASET__PATH")]
    data: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "FUNNELBOARD__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Disable the DAU/MAU/stickiness module
    #[arg(long, default_value_t = false)]
    no_activity: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnelboard=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Funnelboard starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(data) = cli.data {
        config.dataset.path = data;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.no_activity {
        config.analytics.enable_activity = false;
    }

    info!(
        dataset = %config.dataset.path,
        http_port = config.api.http_port,
        activity = config.analytics.enable_activity,
        "Configuration loaded"
    );

    // Load the dataset once; a missing file or column is fatal.
    let store = DatasetStore::new(config.dataset.unit_cost);
    let dataset = store
        .load(Path::new(&config.dataset.path))
        .with_context(|| format!("failed to load dataset '{}'", config.dataset.path))?;

    if dataset.is_empty() {
        warn!("Dataset has a header but no rows; every view will be empty");
    }

    let engine = Arc::new(MetricsEngine::new(dataset, config.analytics.clone()));

    // Start API server
    let api_server = ApiServer::new(config, engine);

    if let Err(e) = api_server.start_metrics().await {
        warn!(error = %e, "Failed to start metrics exporter");
    }

    info!("Funnelboard is ready to serve the dashboard");
    api_server.start_http().await
}
