//! Axum server wiring.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::SignalingError;
use crate::handler::ws_handler;
use crate::state::ServerState;

/// Shared state handed to axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub state: ServerState,
    pub config: ServerConfig,
}

/// The signaling relay server.
pub struct SignalServer {
    config: ServerConfig,
    state: ServerState,
}

/// `GET /health` response body.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rooms: usize,
    pub connections: usize,
}

impl SignalServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: ServerState::new(),
        }
    }

    /// The room registry backing this server.
    pub fn state(&self) -> &ServerState {
        &self.state
    }

    /// Build the router: a health check plus the single-segment room route.
    pub fn router(&self) -> Router {
        let app = AppState {
            state: self.state.clone(),
            config: self.config.clone(),
        };
        Router::new()
            .route("/health", get(health_handler))
            .route("/{room}", get(ws_handler))
            .with_state(app)
    }

    /// Bind and serve on a background task. Returns the bound address, which
    /// is the actual port when the config asked for port `0`.
    pub async fn listen(&self) -> Result<(SocketAddr, JoinHandle<()>), SignalingError> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "server task exited");
            }
        });
        Ok((addr, handle))
    }

    /// Bind and serve on the current task until ctrl-c.
    pub async fn serve(self) -> Result<(), SignalingError> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "signaling relay listening");
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
    }
}

/// `GET /health`
async fn health_handler(State(app): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rooms: app.state.room_count(),
        connections: app.state.connection_count(),
    })
}
