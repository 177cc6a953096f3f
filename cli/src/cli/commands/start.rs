use std::path::PathBuf;

use miniultimax_core::config::{expand_path, BackendMode, Config};
use miniultimax_core::proxy::ProxyServer;

/// Command-line values that win over file and environment
pub struct Overrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub mode: Option<BackendMode>,
    pub static_dir: Option<PathBuf>,
    pub debug: bool,
}

pub async fn run(mut config: Config, overrides: Overrides) -> anyhow::Result<()> {
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(mode) = overrides.mode {
        config.backend.mode = mode;
    }
    if let Some(dir) = overrides.static_dir {
        config.ui.static_dir = Some(dir);
    }
    if overrides.debug {
        config.server.debug = true;
    }
    config.ui.static_dir = config.ui.static_dir.as_ref().map(expand_path);

    tracing::info!("Starting MiniUltiMaxConsole gateway...");
    tracing::info!("  Host: {}", config.server.bind_host());
    tracing::info!("  Port: {}", config.server.port);
    tracing::info!("  Mode: {}", config.backend.mode.as_str());
    tracing::info!("  Upstream: {}", config.upstream.base_url);
    tracing::info!("  API key: {}", config.masked_api_key());
    if config.backend.mode == BackendMode::Fixture {
        tracing::warn!("Fixture mode: serving sample data, nothing is forwarded to the game server");
    }

    let server = ProxyServer::from_config(&config)?;

    tracing::info!("Gateway starting on http://{}:{}", config.server.bind_host(), config.server.port);
    tracing::info!("Press Ctrl+C to stop");

    // Run server (blocks until shutdown)
    server.run().await?;

    Ok(())
}
