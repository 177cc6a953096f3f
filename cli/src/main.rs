use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

mod cli;

use cli::{Cli, Commands};

fn log_filter(level: &str) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive(format!("miniultimax_console={}", level).parse()?)
        .add_directive(format!("miniultimax_core={}", level).parse()?)
        .add_directive("tower_http=debug".parse()?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging at info; the level is adjusted once the config is known
    let (filter, filter_handle) = reload::Layer::new(log_filter("info")?);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let (config, source) = cli::commands::effective_config(cli.config.clone())?;

    let debug_flag = matches!(cli.command, Commands::Start { debug: true, .. });
    let level = if debug_flag || config.server.debug {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    filter_handle.reload(log_filter(&level)?)?;

    match cli.command {
        Commands::Start { port, host, mode, static_dir, debug } => {
            let overrides = cli::commands::start::Overrides { port, host, mode, static_dir, debug };
            cli::commands::start::run(config, overrides).await?;
        }
        Commands::Status => {
            cli::commands::status::run(config, source).await?;
        }
        Commands::Routes => {
            cli::commands::routes::run(&config);
        }
    }

    Ok(())
}
