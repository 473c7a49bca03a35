//! House price HTTP server
//!
//! Serves `GET /health` and `POST /api/v1/predict` on top of a predictor
//! loaded once at startup.

mod api;
mod error;
mod handlers;
mod models;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::SERVICE_NAME;
pub use models::{HealthResponse, PredictionRequest, PredictionResponse};
pub use state::AppState;

use crate::config::AppConfig;
use crate::inference::HousePredictor;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `API_HOST` and `API_PORT`
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(d.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(d.port),
        }
    }
}

/// Load the predictor, then serve until Ctrl+C
pub async fn run_server(config: ServerConfig, app_config: AppConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        models_path = %app_config.models_path.display(),
        model_date = ?app_config.model_date,
        "Loading predictor"
    );

    let predictor = HousePredictor::load(&app_config).map_err(|e| {
        error!(error = %e, "Failed to load predictor, aborting startup");
        e
    })?;

    let state = Arc::new(AppState::new(predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        pid = std::process::id(),
        started_at = %start_time.to_rfc3339(),
        "House price API listening"
    );
    info!(url = %format!("http://{}/api/v1/predict", addr), "Prediction endpoint available");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, stopping server gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
