//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default control API host binding.
pub const DEFAULT_API_HOST: &str = "127.0.0.1";

/// Default control API port.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/txsync";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 25;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 5;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds.
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default maximum database connection lifetime in seconds.
pub const DEFAULT_DATABASE_MAX_LIFETIME_SECS: u64 = 300;

/// Default SFTP port.
pub const DEFAULT_SFTP_PORT: u16 = 22;

/// Default SFTP connect timeout in seconds.
pub const DEFAULT_SFTP_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default remote directory holding per-client log subdirectories.
pub const DEFAULT_SFTP_SOURCE_ROOT: &str = "/logs";

/// Default remote directory mirroring archived (already ingested) files.
pub const DEFAULT_SFTP_ARCHIVE_ROOT: &str = "/logs/processed";

/// Default interval between sync cycles in seconds (5 minutes).
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub sftp: SftpConfig,
    pub sync: SyncConfig,
}

/// Control API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Remote SFTP store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SftpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Path to the private key used for public-key authentication.
    /// A leading `~` expands to the home directory.
    pub private_key_path: PathBuf,
    /// Verify the server's host key against `~/.ssh/known_hosts`.
    pub verify_host_key: bool,
    pub connect_timeout_secs: u64,
    /// Remote directory containing one subdirectory per client.
    pub source_root: String,
    /// Remote directory mirroring successfully ingested files.
    pub archive_root: String,
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub interval_secs: u64,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            api: ApiConfig {
                host: std::env::var("API_HOST").unwrap_or_else(|_| DEFAULT_API_HOST.to_string()),
                port: std::env::var("API_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_API_PORT),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
                max_lifetime_secs: std::env::var("DATABASE_MAX_LIFETIME")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_LIFETIME_SECS),
            },
            sftp: SftpConfig {
                host: std::env::var("SFTP_HOST").unwrap_or_default(),
                port: std::env::var("SFTP_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SFTP_PORT),
                username: std::env::var("SFTP_USERNAME").unwrap_or_default(),
                private_key_path: expand_tilde(
                    &std::env::var("SFTP_PRIVATE_KEY").unwrap_or_default(),
                ),
                verify_host_key: std::env::var("SFTP_VERIFY_HOST_KEY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
                connect_timeout_secs: std::env::var("SFTP_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SFTP_CONNECT_TIMEOUT_SECS),
                source_root: std::env::var("SFTP_SOURCE_ROOT")
                    .unwrap_or_else(|_| DEFAULT_SFTP_SOURCE_ROOT.to_string()),
                archive_root: std::env::var("SFTP_ARCHIVE_ROOT")
                    .unwrap_or_else(|_| DEFAULT_SFTP_ARCHIVE_ROOT.to_string()),
            },
            sync: SyncConfig {
                interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.port == 0 {
            anyhow::bail!("API port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.sftp.host.is_empty() {
            anyhow::bail!("SFTP_HOST must be set");
        }

        if self.sftp.username.is_empty() {
            anyhow::bail!("SFTP_USERNAME must be set");
        }

        if self.sync.interval_secs == 0 {
            anyhow::bail!("Sync interval must be greater than 0");
        }

        if !self.sftp.verify_host_key {
            tracing::warn!("SFTP host key verification is disabled");
        }

        Ok(())
    }
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: DEFAULT_API_HOST.to_string(),
                port: DEFAULT_API_PORT,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
                max_lifetime_secs: DEFAULT_DATABASE_MAX_LIFETIME_SECS,
            },
            sftp: SftpConfig {
                host: "sftp.example.com".to_string(),
                port: DEFAULT_SFTP_PORT,
                username: "loguser".to_string(),
                private_key_path: PathBuf::from("/etc/txsync/id_ed25519"),
                verify_host_key: true,
                connect_timeout_secs: DEFAULT_SFTP_CONNECT_TIMEOUT_SECS,
                source_root: DEFAULT_SFTP_SOURCE_ROOT.to_string(),
                archive_root: DEFAULT_SFTP_ARCHIVE_ROOT.to_string(),
            },
            sync: SyncConfig {
                interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_missing_sftp_host_rejected() {
        let mut config = test_config();
        config.sftp.host.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds_rejected() {
        let mut config = test_config();
        config.database.min_connections = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = test_config();
        config.sync.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde("~/.ssh/id_rsa"), home.join(".ssh/id_rsa"));
        assert_eq!(
            expand_tilde("/abs/path/key"),
            PathBuf::from("/abs/path/key")
        );
    }
}
