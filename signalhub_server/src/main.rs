//! Binary entry point for the signaling relay.

use signalhub_server::{ServerConfig, SignalServer, SignalingError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), SignalingError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        heartbeat_secs = config.heartbeat_interval.as_secs(),
        "starting signaling relay"
    );
    SignalServer::new(config).serve().await
}
