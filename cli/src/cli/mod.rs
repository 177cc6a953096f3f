pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use miniultimax_core::config::BackendMode;

#[derive(Parser)]
#[command(name = "miniultimax-console")]
#[command(author, version, about = "Console gateway - forwards console requests to game servers")]
pub struct Cli {
    /// Path to config file (checked in order: local config.toml, ~/.config/miniultimax-console/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway
    Start {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Backend: "proxy" forwards to the game server, "fixture" serves sample data
        #[arg(short, long)]
        mode: Option<BackendMode>,

        /// Directory with the built browser UI
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Debug logging
        #[arg(long)]
        debug: bool,
    },

    /// Show effective configuration and check whether a gateway is running
    Status,

    /// Print the route table
    Routes,
}
