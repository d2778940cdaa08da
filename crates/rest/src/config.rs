//! Server configuration.
//!
//! Constructed from command line arguments or environment variables (each
//! flag carries an `env =` fallback), or programmatically for tests.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PORT` | 3000 | Server port |
//! | `HOST` | 0.0.0.0 | Host to bind |
//! | `MONGODB_URI` | — | Primary store connection string |
//! | `ASSETDESK_DB_NAME` | assetdesk | Database name on the primary store |
//! | `ASSETDESK_REQUIRE_DATABASE` | false | Fail startup when the primary is unreachable |
//! | `ASSETDESK_UPLOAD_DIR` | uploads | Attachment payload directory |
//! | `ASSETDESK_LOG_LEVEL` | info | Log level |
//! | `ASSETDESK_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `ASSETDESK_MAX_UPLOAD_SIZE` | 10485760 | Max attachment size (bytes) |
//! | `ASSETDESK_ENABLE_CORS` | true | Enable permissive CORS |

use clap::Parser;

/// Configuration for the Assetdesk REST server.
#[derive(Debug, Clone, Parser)]
#[command(name = "assetdesk")]
#[command(about = "Internal IT asset / helpdesk tracking API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// MongoDB connection string. When absent the server runs on the
    /// volatile in-memory store.
    #[arg(long, env = "MONGODB_URI")]
    pub database_url: Option<String>,

    /// Database name on the primary store.
    #[arg(long, env = "ASSETDESK_DB_NAME", default_value = "assetdesk")]
    pub db_name: String,

    /// Treat an unreachable primary store as a fatal startup error instead
    /// of degrading to the in-memory store.
    #[arg(long, env = "ASSETDESK_REQUIRE_DATABASE", default_value = "false")]
    pub require_database: bool,

    /// Directory for attachment payloads.
    #[arg(long, env = "ASSETDESK_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ASSETDESK_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "ASSETDESK_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Maximum attachment payload size in bytes.
    #[arg(long, env = "ASSETDESK_MAX_UPLOAD_SIZE", default_value = "10485760")]
    pub max_upload_size: usize,

    /// Enable permissive CORS (the API serves browser frontends on other
    /// origins).
    #[arg(long, env = "ASSETDESK_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            db_name: "assetdesk".to_string(),
            require_database: false,
            upload_dir: "uploads".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            max_upload_size: 10 * 1024 * 1024,
            enable_cors: true,
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from environment variables only.
    pub fn from_env() -> Self {
        Self::parse_from(std::iter::empty::<String>())
    }

    /// A quiet, in-memory configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "error".to_string(),
            enable_cors: false,
            ..Self::default()
        }
    }

    /// The socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_name, "assetdesk");
        assert!(config.database_url.is_none());
        assert!(!config.require_database);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_cli_overrides() {
        let config = ServerConfig::parse_from([
            "assetdesk",
            "--port",
            "8080",
            "--db-name",
            "assetdesk_test",
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_name, "assetdesk_test");
    }
}
