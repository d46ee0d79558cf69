//! Server setup and lifecycle for the LearnPath backend.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use config::{Config, load_layered};

use crate::error::{ApiError, Result};
use crate::routes::create_router;
use crate::service::Providers;
use crate::state::AppState;
use crate::telemetry::{init_metrics, init_tracing};

/// Environment variable naming an optional TOML or YAML config file.
pub const CONFIG_FILE_ENV: &str = "LP_CONFIG_FILE";

/// The LearnPath HTTP server.
pub struct LearnPathServer {
    state: Arc<AppState>
}

impl LearnPathServer {
    /// Creates a server with real providers and, if enabled, the Prometheus
    /// recorder.
    pub fn new(config: Config) -> Result<Self> {
        let metrics = init_metrics(&config.observability);
        let providers = Providers::from_config(&config.providers)
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        let mut builder = AppState::builder(config).providers(providers);
        if let Some(handle) = metrics {
            builder = builder.metrics(handle);
        }
        Ok(Self {
            state: Arc::new(builder.build()?)
        })
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Runs the HTTP server until Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let server = &self.state.config.server;
        let addr: SocketAddr = format!("{}:{}", server.host, server.port)
            .parse()
            .map_err(|e| ApiError::Configuration(format!("Invalid address: {e}")))?;

        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(
            %addr,
            dummy_mode = server.dummy_mode,
            "LearnPath server starting"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Server(format!("Server error: {e}")))?;

        tracing::info!("LearnPath server stopped");
        Ok(())
    }

    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// Loads configuration from defaults, the optional `LP_CONFIG_FILE` and the
/// environment.
pub fn load_config() -> Result<Config> {
    let file = std::env::var(CONFIG_FILE_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    load_layered(file.as_deref()).map_err(|e| ApiError::Configuration(e.to_string()))
}

/// Entry point for running the server from configuration.
pub async fn run_server(config: Config) -> Result<()> {
    LearnPathServer::new(config)?.run().await
}

/// Entry point for running the server from `.env` and environment
/// variables.
pub async fn run_from_env() -> Result<()> {
    if let Err(e) = dotenv::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let config = load_config()?;
    init_tracing(&config.observability);
    run_server(config).await
}
