// Dashboard module - HTTP + WebSocket front of a Kickboard application
//
// Serves the UI shell and the JS bundle, receives client events over a socket
// and pushes component updates back.

mod event_stream;
mod server;
mod socket;
mod static_assets;

pub use event_stream::EventBroadcaster;
pub use server::DashboardServer;
pub use socket::{route_frame, route_packed_frame};
pub use static_assets::{choose_bundle, BundleChoice};

use crate::{KickboardError, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Dashboard configuration
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `bundle.js` and/or `bundle.js.gz`
    pub static_dir: PathBuf,
    pub title: String,
    pub broadcast_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9991,
            static_dir: PathBuf::from("static"),
            title: "Kickboard".to_string(),
            broadcast_capacity: 1000,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("KICKBOARD_HOST").unwrap_or(default.host),
            port: std::env::var("KICKBOARD_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(default.port),
            static_dir: std::env::var("KICKBOARD_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),
            ..default
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Fail when something already accepts connections on `host:port`
pub async fn ensure_port_available(host: &str, port: u16) -> Result<()> {
    let probe = match host {
        "0.0.0.0" | "" => "127.0.0.1",
        "::" => "::1",
        other => other,
    };
    let attempt = tokio::time::timeout(Duration::from_millis(500), TcpStream::connect((probe, port))).await;
    match attempt {
        Ok(Ok(_)) => Err(KickboardError::PortUnavailable {
            host: host.to_string(),
            port,
        }),
        Ok(Err(e)) => {
            debug!(target: "dashboard", host = %host, port, error = %e, "Port is free");
            Ok(())
        }
        Err(_) => Ok(()),
    }
}
