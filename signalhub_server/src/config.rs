//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the signaling relay.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`).
    pub host: String,
    /// Port to bind (default `4000`; `0` auto-assigns).
    pub port: u16,
    /// Interval between liveness probes. A connection that has not ponged
    /// by the following tick is terminated.
    pub heartbeat_interval: Duration,
    /// Max WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4000,
            heartbeat_interval: Duration::from_secs(5),
            max_message_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `SIGNALHUB_HOST`, `SIGNALHUB_PORT`,
    /// `SIGNALHUB_HEARTBEAT_SECS`. Unparseable values fall back silently.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("SIGNALHUB_HOST") {
            config.host = host;
        }
        if let Some(port) = std::env::var("SIGNALHUB_PORT").ok().and_then(|v| v.parse().ok()) {
            config.port = port;
        }
        if let Some(secs) = std::env::var("SIGNALHUB_HEARTBEAT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.heartbeat_interval = Duration::from_secs(secs);
        }
        config
    }

    /// The `host:port` pair to bind.
    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 4000);
    }

    #[test]
    fn default_heartbeat_interval() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(5));
    }

    #[test]
    fn serde_roundtrip() {
        let cfg = ServerConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.host, cfg.host);
        assert_eq!(back.port, cfg.port);
        assert_eq!(back.heartbeat_interval, cfg.heartbeat_interval);
        assert_eq!(back.max_message_size, cfg.max_message_size);
    }
}
