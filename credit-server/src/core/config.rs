//! Server configuration
//!
//! All settings come from environment variables with sensible defaults:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/credit-server | working directory (database, logs) |
//! | HTTP_PORT | 3102 | HTTP API port |
//! | LICENSE_SERVICE_URL | http://localhost:3101 | License service base URL |
//! | USER_SERVICE_URL | http://localhost:3100 | User directory base URL |
//! | REQUEST_TIMEOUT_SECS | 10 | remote call timeout |
//! | AUDIT_BUFFER | 256 | activity log queue size |
//! | ENVIRONMENT | development | development \| staging \| production |

use std::path::PathBuf;

use crate::auth::JwtConfig;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Base URL of the remote License service
    pub license_service_url: String,
    /// Base URL of the remote User directory
    pub user_service_url: String,
    /// Timeout for every remote platform call, in seconds.
    /// A timed-out call counts as an upstream failure; nothing retries.
    pub request_timeout_secs: u64,
    /// Activity log queue size
    pub audit_buffer: usize,
    /// JWT validation configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/credit-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3102),
            license_service_url: std::env::var("LICENSE_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3101".into()),
            user_service_url: std::env::var("USER_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:3100".into()),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            audit_buffer: std::env::var("AUDIT_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(256),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the parts tests care about
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// Directory holding the SQLite database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Make sure the working directory layout exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
