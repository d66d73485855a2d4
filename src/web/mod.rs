//! Web layer module
//!
//! HTTP interface of the avatar proxy. Handlers stay thin: the avatar route
//! validates the hash and delegates everything else to the
//! [`AvatarService`](crate::services::avatar::AvatarService).
//!
//! # Routes
//!
//! - `GET /avatar/{hash}`: avatar image, or the placeholder on any failure
//! - `GET /health`: service status with cache and pool figures

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::services::avatar::SharedAvatarService;

pub mod handlers;
pub mod responses;

pub use responses::{ApiResponse, HealthStatus};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub avatars: Arc<SharedAvatarService>,
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, avatars: Arc<SharedAvatarService>) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = create_router(AppState { config, avatars });

        Ok(Self { app, addr })
    }

    /// Start the web server, stopping on SIGINT or SIGTERM
    pub async fn serve(self) -> Result<()> {
        self.serve_with_cancellation(None).await
    }

    /// Start the web server, stopping when `cancellation_token` fires
    ///
    /// Without a token the server stops on SIGINT or SIGTERM.
    pub async fn serve_with_cancellation(
        self,
        cancellation_token: Option<CancellationToken>,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;

        let shutdown_signal = async move {
            match cancellation_token {
                Some(token) => {
                    token.cancelled().await;
                    info!("Web server received cancellation signal, shutting down gracefully");
                }
                None => wait_for_signal().await,
            }
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Build the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let enable_gzip = state.config.web.enable_gzip;

    let router = Router::new()
        .route("/avatar/{hash}", get(handlers::avatar::get_avatar))
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_gzip {
        // the default predicate skips images, avatars are compressed too
        router.layer(
            CompressionLayer::new().compress_when(SizeAbove::new(32).and(NotForContentType::GRPC)),
        )
    } else {
        router
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        _ => {
            tracing::error!("Failed to install signal handlers, running until killed");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
        _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down gracefully"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        return std::future::pending().await;
    }
    info!("Received Ctrl+C, shutting down gracefully");
}
