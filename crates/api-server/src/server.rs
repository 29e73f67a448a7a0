//! HTTP server wiring for the dashboard API.

use crate::rest::{self, AppState};
use axum::routing::get;
use axum::Router;
use funnel_core::config::AppConfig;
use funnel_metrics::MetricsEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Serves the dashboard tables over REST.
pub struct ApiServer {
    config: AppConfig,
    engine: Arc<MetricsEngine>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<MetricsEngine>) -> Self {
        Self { config, engine }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
            start_time: Instant::now(),
        };

        Router::new()
            // Dashboard tables
            .route("/v1/dashboard", get(rest::dashboard))
            .route("/v1/kpis", get(rest::kpis))
            .route("/v1/funnel", get(rest::funnel))
            .route("/v1/installs/daily", get(rest::daily_installs))
            .route("/v1/revenue", get(rest::revenue))
            .route("/v1/retention", get(rest::retention))
            .route("/v1/activity", get(rest::activity))
            .route("/v1/abtest", get(rest::abtest))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP server and serve until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus metrics exporter on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
