//! Headless session server.
//!
//! Serves independent 2048 games over line-delimited JSON. Configuration is
//! taken from `TWENTY48_*` environment variables and logs go to stderr.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tui_2048::adapter::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();
    info!(
        host = %config.host,
        port = config.port,
        max_sessions = config.max_sessions,
        spawn_policy = config.spawn_policy.as_str(),
        "starting 2048 session server"
    );

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
