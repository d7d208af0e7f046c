//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use authkeep::db::DatabaseConfig;
use authkeep::security::TokenConfig;
use std::net::SocketAddr;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Where accounts and sessions are stored
    pub storage: StorageBackend,
    /// Database configuration (used by the postgres backend)
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Token lifetimes
    pub tokens: TokenLifetimes,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Security-related configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT signing secret (required)
    pub jwt_secret: String,
    /// Password hashing pepper (required)
    pub password_pepper: String,
}

/// Access and refresh token lifetimes, in seconds
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

/// Upper bound for either token lifetime (10 years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 3600;

impl TokenLifetimes {
    /// Convert to the issuer's lifetimes
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a lifetime is not positive or exceeds
    /// [`MAX_TOKEN_TTL_SECS`]
    pub fn to_token_config(self) -> Result<TokenConfig, ConfigError> {
        Ok(TokenConfig {
            access_ttl: ttl("ACCESS_TOKEN_TTL_SECS", self.access_ttl_secs)?,
            refresh_ttl: ttl("REFRESH_TOKEN_TTL_SECS", self.refresh_ttl_secs)?,
        })
    }
}

fn ttl(var: &str, secs: i64) -> Result<chrono::TimeDelta, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        var: var.to_string(),
        reason,
    };

    if secs <= 0 {
        return Err(invalid("Must be greater than 0".to_string()));
    }
    if secs > MAX_TOKEN_TTL_SECS {
        return Err(invalid(format!("Must be at most {MAX_TOKEN_TTL_SECS}s (10 years)")));
    }
    chrono::TimeDelta::try_seconds(secs)
        .ok_or_else(|| invalid(format!("{secs}s is out of range")))
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        let defaults = TokenConfig::default();
        Self {
            access_ttl_secs: defaults.access_ttl.num_seconds(),
            refresh_ttl_secs: defaults.refresh_ttl.num_seconds(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `storage_override` - Optional storage backend override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        storage_override: Option<StorageBackend>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_addr("SERVER_BIND")?.unwrap_or_else(default_bind),
        };

        let storage = match storage_override {
            Some(storage) => storage,
            None => match std::env::var("STORAGE_BACKEND") {
                Ok(value) => parse_storage(&value)?,
                Err(_) => StorageBackend::Postgres,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        // Security configuration (REQUIRED)
        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            std::env::var("PASSWORD_PEPPER").map_err(|_| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let defaults = TokenLifetimes::default();
        let tokens = TokenLifetimes {
            access_ttl_secs: parse_env_or("ACCESS_TOKEN_TTL_SECS", defaults.access_ttl_secs),
            refresh_ttl_secs: parse_env_or("REFRESH_TOKEN_TTL_SECS", defaults.refresh_ttl_secs),
        };

        let config = ServerConfig {
            bind,
            storage,
            database,
            security: SecurityConfig {
                jwt_secret,
                password_pepper,
            },
            tokens,
            metrics_bind: parse_addr("METRICS_BIND")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.security.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        self.tokens.to_token_config()?;

        if self.tokens.refresh_ttl_secs < self.tokens.access_ttl_secs {
            return Err(ConfigError::Invalid {
                var: "REFRESH_TOKEN_TTL_SECS".to_string(),
                reason: format!(
                    "Must be at least the access token lifetime ({}s)",
                    self.tokens.access_ttl_secs
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Parse a storage backend name (`postgres` or `memory`)
pub fn parse_storage(value: &str) -> Result<StorageBackend, ConfigError> {
    match value.to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
        "memory" => Ok(StorageBackend::Memory),
        other => Err(ConfigError::Invalid {
            var: "STORAGE_BACKEND".to_string(),
            reason: format!("Unknown backend '{other}', expected 'postgres' or 'memory'"),
        }),
    }
}

fn parse_addr(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{value}' is not a valid IP:PORT address"),
        }),
        Err(_) => Ok(None),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
