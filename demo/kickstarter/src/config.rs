use kickboard_core::DashboardConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// High-level configuration for the Kickstarter dashboard
#[derive(Clone, Debug)]
pub struct KickstarterConfig {
    pub dashboard: DashboardConfig,
    /// Cleaned Kickstarter export (CSV)
    pub data_path: PathBuf,
    /// Projects drawn at random for the scatter plot
    pub sample_size: usize,
}

impl Default for KickstarterConfig {
    fn default() -> Self {
        let mut dashboard = DashboardConfig::from_env();
        dashboard.title = "Kickstarter Dashboard".to_string();
        Self {
            dashboard,
            data_path: std::env::var("KICKSTARTER_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("kickstarter-cleaned.csv")),
            sample_size: std::env::var("KICKSTARTER_SAMPLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }
}

impl KickstarterConfig {
    /// Load configuration from a TOML file (explicit path, KICKSTARTER_CONFIG or ./kickstarter.toml),
    /// overlaying values onto env-driven defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let default = Self::default();
        let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
            PathBuf::from(
                std::env::var("KICKSTARTER_CONFIG").unwrap_or_else(|_| "kickstarter.toml".into()),
            )
        });
        if !path.exists() {
            tracing::info!(path = %path.display(), "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(&path) {
            Ok(s) => Self::from_toml_str(&s, default),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn from_toml_str(s: &str, default: Self) -> Self {
        match toml::from_str::<KickstarterToml>(s) {
            Ok(t) => t.overlay(default),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse TOML; using defaults");
                default
            }
        }
    }
}

// =========================
// TOML overlay definitions
// =========================

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct KickstarterToml {
    pub data_path: Option<PathBuf>,
    pub sample_size: Option<usize>,
    pub server: Option<ServerToml>,
}

impl KickstarterToml {
    fn overlay(self, mut base: KickstarterConfig) -> KickstarterConfig {
        if let Some(p) = self.data_path {
            base.data_path = p;
        }
        if let Some(n) = self.sample_size {
            base.sample_size = n;
        }
        if let Some(s) = self.server {
            s.apply(&mut base.dashboard);
        }
        base
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct ServerToml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub title: Option<String>,
}

impl ServerToml {
    fn apply(self, d: &mut DashboardConfig) {
        if let Some(v) = self.host {
            d.host = v;
        }
        if let Some(v) = self.port {
            d.port = v;
        }
        if let Some(v) = self.static_dir {
            d.static_dir = v;
        }
        if let Some(v) = self.title {
            d.title = v;
        }
    }
}
