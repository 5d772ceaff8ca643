//! Command-line and environment configuration for the web server.

use clap::Parser;
use frontdesk_core::DEFAULT_LOW_STOCK_THRESHOLD;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings; every flag can also be set through its `FRONTDESK_*`
/// environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "frontdesk", version, about = "Hospital front-desk web server")]
pub struct ServerConfig {
    /// SQLite database file, created and migrated on startup.
    #[arg(long, env = "FRONTDESK_DB_PATH", default_value = "frontdesk.sqlite3")]
    pub db_path: PathBuf,

    #[arg(long, env = "FRONTDESK_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "FRONTDESK_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset.
    #[arg(long, env = "FRONTDESK_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Default threshold of the low-stock report.
    #[arg(
        long,
        env = "FRONTDESK_LOW_STOCK_THRESHOLD",
        default_value_t = DEFAULT_LOW_STOCK_THRESHOLD
    )]
    pub low_stock_threshold: i64,
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        ServerConfig::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "frontdesk",
            "--db-path",
            "/tmp/clinic.sqlite3",
            "--bind",
            "0.0.0.0:8080",
            "--low-stock-threshold",
            "25",
        ])
        .unwrap();
        assert_eq!(config.db_path.to_str(), Some("/tmp/clinic.sqlite3"));
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.low_stock_threshold, 25);
    }

    #[test]
    fn malformed_bind_address_is_rejected() {
        assert!(ServerConfig::try_parse_from(["frontdesk", "--bind", "localhost"]).is_err());
    }
}
