//! CLI command implementations
//!
//! `serve` runs until the listener fails. `migrate` and `check` are one-shot
//! and report a JSON object on stdout.

use std::path::Path;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::db::{apply_schema, Params, QueryExecutor, SqliteConnector, TABLES};
use crate::gateway::statements::PING;
use crate::gateway::{GatewayServer, GatewayState};
use crate::observability::{Logger, ObservationScope};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Migrate { config } => migrate(&config),
        Command::Check { config } => check(&config),
    }
}

/// Load the config file and apply its log level
fn load(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

/// Start the HTTP gateway
///
/// The database is not touched until the first request arrives; a missing or
/// unreachable database shows up as 503 responses rather than a boot failure.
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let connector = SqliteConnector::new(&config.database);
    let executor = QueryExecutor::new(connector);
    let server = GatewayServer::new(config.server.clone(), GatewayState::new(executor));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Create the database file if needed and apply the bundled schema
pub fn migrate(config_path: &Path) -> CliResult<()> {
    let config = load(config_path)?;
    let connector = SqliteConnector::new(&config.database);
    let target = connector.path().display().to_string();

    let scope = ObservationScope::new("MIGRATE");
    let applied = connector.create().and_then(|conn| apply_schema(&conn));
    if let Err(e) = applied {
        scope.fail(&e.to_string());
        return Err(CliError::from(e));
    }
    scope.complete_with_fields(&[("target", target.as_str())]);

    write_response(json!({
        "database": target,
        "tables": TABLES.len(),
    }))
}

/// Verify the database is reachable
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = load(config_path)?;
    let connector = SqliteConnector::new(&config.database);
    let target = connector.path().display().to_string();

    let executor = QueryExecutor::new(connector);
    executor.fetch_one(PING, &Params::new())?;

    write_response(json!({ "database": target, "reachable": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, db_name: &str) -> std::path::PathBuf {
        let db_path = dir.path().join(db_name);
        let config_path = dir.path().join("classsel.json");
        let body = json!({ "database": { "path": db_path } });
        fs::write(&config_path, body.to_string()).unwrap();
        config_path
    }

    #[test]
    fn test_migrate_then_check() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "classsel.db");

        migrate(&config_path).unwrap();
        assert!(dir.path().join("classsel.db").exists());

        check(&config_path).unwrap();
    }

    #[test]
    fn test_migrate_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "classsel.db");

        migrate(&config_path).unwrap();
        migrate(&config_path).unwrap();
    }

    #[test]
    fn test_check_fails_without_database() {
        let dir = TempDir::new().unwrap();
        let config_path = write_config(&dir, "missing.db");

        let err = check(&config_path).unwrap_err();
        assert_eq!(err.code(), super::super::errors::CliErrorCode::DatabaseError);
        assert!(!dir.path().join("missing.db").exists());
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let err = check(Path::new("/nonexistent/classsel.json")).unwrap_err();
        assert_eq!(err.code(), super::super::errors::CliErrorCode::ConfigError);
    }
}
