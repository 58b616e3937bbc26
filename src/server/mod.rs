//! Carpark HTTP server
//!
//! axum front end over a single shared parking lot

pub mod error;
pub mod handlers;
pub mod routes;

use axum::{extract::Extension, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::metrics;
use crate::pool::{ParkingLot, SharedParkingLot};

pub use error::ApiError;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub bind: String,
    /// HTTP port
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub lot: SharedParkingLot,
}

impl AppState {
    pub fn new(lot: SharedParkingLot) -> Self {
        Self { lot }
    }

    /// Run one pool operation under the lot's lock and record its outcome
    pub fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ParkingLot) -> Result<T>,
    ) -> Result<T> {
        let (result, total, occupied) = self.lot.with(|lot| {
            let result = f(lot);
            (result, lot.total_slots(), lot.occupied_count())
        });

        metrics::update_occupancy(total, occupied);
        match &result {
            Ok(_) => metrics::record_operation(operation, "ok"),
            Err(e) => {
                warn!(operation, kind = e.kind(), error = %e, "Operation rejected");
                metrics::record_operation(operation, e.kind());
            }
        }
        result
    }
}

/// Build the application router
pub fn router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        .merge(routes::parking_routes())
        .merge(routes::health_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(Extension(Arc::new(state))),
        );

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the Carpark server
pub async fn start_server(config: ServerConfig, lot: SharedParkingLot) -> anyhow::Result<()> {
    info!(
        addr = %config.bind,
        port = config.port,
        "Starting Carpark HTTP server"
    );

    metrics::init_metrics();
    let (total, occupied) = lot.occupancy();
    metrics::update_occupancy(total, occupied);

    let app = router(AppState::new(lot), config.enable_cors);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Health: http://{}/health", addr);
    info!("Metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            anyhow::anyhow!("Server failed: {}", e)
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
