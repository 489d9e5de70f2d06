//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod chat;
pub mod common;
pub mod config;
pub mod lookup;
pub mod serve;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "premiumbot")]
#[command(version)]
#[command(about = "Conversational cancer insurance sales agent", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.premiumbot/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the WebSocket chat gateway
    Serve {
        /// Host to bind to (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Talk to the advisor in the terminal
    Chat,
    /// Quote premiums once from the table, without the model
    Lookup {
        /// Age or age bracket (e.g. "23" or "20")
        #[arg(long)]
        age: String,
        /// Cancer type (e.g. "Lung Cancer")
        #[arg(long)]
        cancer: String,
        /// Male or Female
        #[arg(long)]
        gender: String,
        /// Coverage option A, B or C (default A)
        #[arg(long)]
        option: Option<String>,
        /// Premium table file (overrides config)
        #[arg(long, value_name = "PATH")]
        table: Option<PathBuf>,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check configuration for errors and warnings
    Check,
}

/// Entry point for the CLI, called from main().
pub async fn run() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    // Respect the logging settings when the config is readable; otherwise
    // fall back to defaults so `config check` can still report the problem.
    let logging_cfg = common::load_config(config_path)
        .map(|c| c.logging)
        .unwrap_or_default();
    if let Err(e) = premiumbot::utils::logging::init_logging(&logging_cfg) {
        eprintln!("Warning: {}", e);
    }

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            println!("premiumbot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { host, port }) => {
            serve::cmd_serve(config_path, host, port).await?;
        }
        Some(Commands::Chat) => {
            chat::cmd_chat(config_path).await?;
        }
        Some(Commands::Lookup {
            age,
            cancer,
            gender,
            option,
            table,
        }) => {
            lookup::cmd_lookup(config_path, &age, &cancer, &gender, option.as_deref(), table)?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(config_path, action)?;
        }
    }

    Ok(())
}
