//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `leadhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use leadhub_app::services::execution_log_service::{DEFAULT_LOG_LIMIT, MAX_LOG_LIMIT};
use leadhub_domain::rule::DEFAULT_MAX_RULES_PER_USER;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Rule management limits.
    pub rules: RulesConfig,
    /// Audit trail query limits.
    pub audit: AuditConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Rules a single user may own, active and inactive together.
    pub max_per_user: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Page size when the client does not ask for one.
    pub default_limit: usize,
    /// Upper bound for a client-supplied page size.
    pub max_limit: usize,
}

impl Config {
    /// Load configuration from `leadhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting values are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("leadhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("LEADHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("LEADHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("LEADHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("LEADHUB_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("LEADHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(max) = var("LEADHUB_MAX_RULES_PER_USER").and_then(|val| val.parse().ok()) {
            self.rules.max_per_user = max;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.rules.max_per_user == 0 {
            return Err(ConfigError::Validation(
                "rules.max_per_user must be at least 1".to_string(),
            ));
        }
        if self.audit.default_limit == 0 || self.audit.default_limit > self.audit.max_limit {
            return Err(ConfigError::Validation(
                "audit limits must satisfy 1 <= default_limit <= max_limit".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:leadhub.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "leadhubd=info,leadhub_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_per_user: DEFAULT_MAX_RULES_PER_USER,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LOG_LIMIT,
            max_limit: MAX_LOG_LIMIT,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
