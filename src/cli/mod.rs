//! CLI interface for paanj-admin
//!
//! Provides subcommands for:
//! - `listen`: Stream admin events to stdout
//! - `request`: Call the admin REST API once
//! - `config`: Show configuration

mod listen;
mod request;

pub use listen::ListenArgs;
pub use request::RequestArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "paanj-admin")]
#[command(about = "Command-line client for the Paanj admin API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Admin secret key, overrides the configuration file
    #[arg(long)]
    pub secret_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream admin events to stdout until Ctrl-C
    Listen(ListenArgs),
    /// Send one request to the admin REST API
    Request(RequestArgs),
    /// Show configuration
    Config,
}
