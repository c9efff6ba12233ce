//! CLI module for the ClassSel gateway
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP gateway
//! - migrate: Provision the database file and schema
//! - check: Probe database connectivity

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, migrate, run, run_command, serve};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
