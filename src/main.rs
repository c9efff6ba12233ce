//! classsel-gateway entry point
//!
//! Argument parsing, configuration and startup all live in the CLI module.
//! This file only reports a failed command and sets the exit status.

use classsel_gateway::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
