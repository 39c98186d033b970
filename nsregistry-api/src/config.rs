//! Configuration management for the namespace registry
//!
//! Settings are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. Configuration file (TOML format)
//! 3. Default values (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::registry::access::DEFAULT_MAX_PAGE_SIZE;

/// Secret used when none is configured. Tokens signed with it are forgeable.
pub const DEFAULT_JWT_SECRET: &str = "nsregistry-default-jwt-secret-change-in-production";

const MIN_JWT_SECRET_LEN: usize = 32;

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NsRegistryConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub registry: RegistryConfig,
    pub kubernetes: KubernetesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite:///var/lib/nsregistry/nsregistry.db")
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
    /// hourly, daily or never
    pub rotation: String,
    /// Emit JSON lines on the console as well
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens
    pub token_ttl_hours: i64,
    /// Username of the administrator seeded into an empty user table
    pub bootstrap_admin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Largest page size accepted by the paged listing
    pub max_page_size: u32,
}

/// Kubernetes clusters the gateway talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Deadline for every call to an API server
    pub request_timeout_secs: u64,
    pub clusters: Vec<ClusterEntry>,
}

/// A `[[kubernetes.clusters]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub code: i64,
    pub name: String,
    pub kubeconfig: PathBuf,
    #[serde(default)]
    pub context: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12345,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:///var/lib/nsregistry/nsregistry.db".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            rotation: "daily".to_string(),
            json_format: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            bootstrap_admin: "admin".to_string(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            clusters: Vec::new(),
        }
    }
}

impl NsRegistryConfig {
    /// Load configuration from the first config file found, then apply
    /// environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.clone(), e.to_string()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            std::env::var("NSREGISTRY_CONFIG").ok().map(PathBuf::from),
            Some(PathBuf::from("/etc/nsregistry/config.toml")),
            Some(PathBuf::from("./config.toml")),
            Some(PathBuf::from("./nsregistry.toml")),
        ];

        paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(host) = var("NSREGISTRY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("NSREGISTRY_PORT") {
            self.server.port = parse_env("NSREGISTRY_PORT", &port)?;
        }

        // Database
        if let Some(url) = var("NSREGISTRY_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(max) = var("NSREGISTRY_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("NSREGISTRY_DATABASE_MAX_CONNECTIONS", &max)?;
        }

        // Logging
        if let Some(level) = var("NSREGISTRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = var("NSREGISTRY_LOG_DIR") {
            self.logging.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(json) = var("NSREGISTRY_LOG_JSON") {
            self.logging.json_format = parse_env("NSREGISTRY_LOG_JSON", &json)?;
        }

        // Auth
        if let Some(secret) = var("NSREGISTRY_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = var("NSREGISTRY_TOKEN_TTL_HOURS") {
            self.auth.token_ttl_hours = parse_env("NSREGISTRY_TOKEN_TTL_HOURS", &ttl)?;
        }

        // Registry
        if let Some(max) = var("NSREGISTRY_MAX_PAGE_SIZE") {
            self.registry.max_page_size = parse_env("NSREGISTRY_MAX_PAGE_SIZE", &max)?;
        }

        // Kubernetes
        if let Some(secs) = var("NSREGISTRY_K8S_TIMEOUT_SECS") {
            self.kubernetes.request_timeout_secs = parse_env("NSREGISTRY_K8S_TIMEOUT_SECS", &secs)?;
        }

        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let mut config = Self::default();
        config.kubernetes.clusters.push(ClusterEntry {
            code: 1,
            name: "default".to_string(),
            kubeconfig: PathBuf::from("/etc/nsregistry/kubeconfig"),
            context: None,
        });
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("Port cannot be 0".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(ConfigError::Validation("Database URL cannot be empty".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "Database max_connections must be at least 1".to_string(),
            ));
        }

        if !matches!(self.logging.rotation.as_str(), "hourly" | "daily" | "never") {
            return Err(ConfigError::Validation(format!(
                "Unknown log rotation '{}'",
                self.logging.rotation
            )));
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Validation(format!(
                "JWT secret must be at least {} bytes",
                MIN_JWT_SECRET_LEN
            )));
        }

        if self.auth.token_ttl_hours <= 0 {
            return Err(ConfigError::Validation("Token TTL must be positive".to_string()));
        }

        if self.registry.max_page_size == 0 {
            return Err(ConfigError::Validation("max_page_size must be at least 1".to_string()));
        }

        if self.kubernetes.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Kubernetes request timeout must be at least 1 second".to_string(),
            ));
        }

        let mut codes = std::collections::HashSet::new();
        for cluster in &self.kubernetes.clusters {
            if !codes.insert(cluster.code) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate cluster code {}",
                    cluster.code
                )));
            }
        }

        Ok(())
    }

    pub fn uses_default_secret(&self) -> bool {
        self.auth.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("Invalid value for {}: '{}'", key, value)))
}

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0:?}: {1}")]
    FileRead(PathBuf, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Config validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = NsRegistryConfig::default();
        assert_eq!(config.server.port, 12345);
        assert_eq!(config.registry.max_page_size, 1000);
        assert_eq!(config.kubernetes.request_timeout_secs, 10);
        assert!(config.kubernetes.clusters.is_empty());
        assert!(config.uses_default_secret());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_with_clusters() {
        let config = NsRegistryConfig::from_toml(
            r#"
            [server]
            port = 8080

            [registry]
            max_page_size = 50

            [kubernetes]
            request_timeout_secs = 3

            [[kubernetes.clusters]]
            code = 100
            name = "prod"
            kubeconfig = "/etc/nsregistry/prod.yaml"
            context = "prod-admin"

            [[kubernetes.clusters]]
            code = 200
            name = "staging"
            kubeconfig = "/etc/nsregistry/staging.yaml"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.registry.max_page_size, 50);
        assert_eq!(config.kubernetes.clusters.len(), 2);
        assert_eq!(config.kubernetes.clusters[0].context.as_deref(), Some("prod-admin"));
        assert!(config.kubernetes.clusters[1].context.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            NsRegistryConfig::from_toml("[server]\nport = \"abc\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("NSREGISTRY_PORT", "9000"),
            ("NSREGISTRY_DATABASE_URL", "sqlite::memory:"),
            ("NSREGISTRY_MAX_PAGE_SIZE", "25"),
            ("NSREGISTRY_LOG_DIR", "/tmp/nsregistry"),
        ]);

        let mut config = NsRegistryConfig::default();
        config.apply_overrides(|key| vars.get(key).cloned()).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.registry.max_page_size, 25);
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/tmp/nsregistry")));
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let vars = env(&[("NSREGISTRY_PORT", "eighty")]);
        let mut config = NsRegistryConfig::default();
        assert!(config.apply_overrides(|key| vars.get(key).cloned()).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = NsRegistryConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = NsRegistryConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = NsRegistryConfig::default();
        config.logging.rotation = "weekly".to_string();
        assert!(config.validate().is_err());

        let mut config = NsRegistryConfig::default();
        for name in ["a", "b"] {
            config.kubernetes.clusters.push(ClusterEntry {
                code: 1,
                name: name.to_string(),
                kubeconfig: PathBuf::from("/dev/null"),
                context: None,
            });
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = NsRegistryConfig::generate_sample();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[database]"));
        assert!(sample.contains("[auth]"));
        assert!(sample.contains("[registry]"));
        assert!(sample.contains("[[kubernetes.clusters]]"));

        let parsed = NsRegistryConfig::from_toml(&sample).unwrap();
        assert_eq!(parsed.kubernetes.clusters[0].code, 1);
    }
}
