//! CLI argument definitions using clap
//!
//! Commands:
//! - classsel-gateway serve --config <path> [--port <n>]
//! - classsel-gateway migrate --config <path>
//! - classsel-gateway check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ClassSel gateway - JSON over HTTP for the ClassSel schema
#[derive(Parser, Debug)]
#[command(name = "classsel-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./classsel.json")]
        config: PathBuf,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the database file if needed and apply the bundled schema
    Migrate {
        /// Path to configuration file
        #[arg(long, default_value = "./classsel.json")]
        config: PathBuf,
    },

    /// Verify the database is reachable and exit
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./classsel.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["classsel-gateway", "serve", "--port", "9000"]).unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("./classsel.json"));
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_migrate() {
        let cli = Cli::try_parse_from(["classsel-gateway", "migrate", "--config", "/etc/sel.json"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate { .. }));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["classsel-gateway", "explain"]).is_err());
    }
}
