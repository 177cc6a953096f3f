use miniultimax_core::config::{Config, ConfigSource};

pub async fn run(config: Config, source: ConfigSource) -> anyhow::Result<()> {
    println!("MiniUltiMaxConsole Status");
    println!("=========================");
    println!();
    println!("Configuration:");
    println!("  Config file: {}", source);
    println!("  Mode: {}", config.backend.mode.as_str());
    println!();
    println!("Server settings:");
    println!("  Host: {}", config.server.bind_host());
    println!("  Port: {}", config.server.port);
    println!("  Debug: {}", config.server.debug);
    println!();
    println!("Upstream:");
    println!("  Base URL: {}", config.upstream.base_url);
    println!("  API key: {}", config.masked_api_key());
    println!("  Timeouts: {}s standard, {}s batch", config.timeouts.standard, config.timeouts.batch);
    if let Some(dir) = &config.ui.static_dir {
        println!("  UI directory: {:?}", dir);
    }

    // Check if server is reachable
    println!();
    let host = match config.server.bind_host() {
        "0.0.0.0" => "127.0.0.1",
        other => other,
    };
    let url = format!("http://{}:{}/health", host, config.server.port);
    match reqwest::get(&url).await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let mode = body.get("mode").and_then(|v| v.as_str()).unwrap_or("unknown");
            println!("Gateway: RUNNING ✓ ({} mode)", mode);
        }
        _ => {
            println!("Gateway: NOT RUNNING");
        }
    }

    Ok(())
}
