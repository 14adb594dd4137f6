use clap::Parser;
use kickboard_core::telemetry;
use kickstarter_dashboard::{build_dashboard, Dataset, KickstarterConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Serve the Kickstarter dashboard
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Host IP
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number
    #[arg(short, long)]
    port: Option<u16>,

    /// Kickstarter CSV export
    #[arg(long, env = "KICKSTARTER_DATA")]
    data: Option<PathBuf>,

    /// Projects sampled for the scatter plot
    #[arg(long)]
    sample: Option<usize>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init(telemetry::DEFAULT_FILTER);

    let cli = Cli::parse();
    let mut cfg = KickstarterConfig::load(cli.config.as_deref());
    if let Some(host) = cli.host {
        cfg.dashboard.host = host;
    }
    if let Some(port) = cli.port {
        cfg.dashboard.port = port;
    }
    if let Some(data) = cli.data {
        cfg.data_path = data;
    }
    if let Some(sample) = cli.sample {
        cfg.sample_size = sample;
    }

    info!(
        addr = %cfg.dashboard.addr(),
        data = %cfg.data_path.display(),
        "Starting Kickstarter dashboard"
    );

    let data = Arc::new(Dataset::load(&cfg.data_path, cfg.sample_size)?);
    let (server, _widgets) = build_dashboard(cfg.dashboard, data)?;
    server.serve().await?;

    Ok(())
}
