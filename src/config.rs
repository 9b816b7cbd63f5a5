//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_refresh_path() -> String {
    "auth/token/refresh/".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            refresh_path: default_refresh_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Sign-in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Google OAuth client identifier
    pub google_client_id: Option<String>,

    #[serde(default = "default_redirect_uri")]
    pub oauth_redirect_uri: String,

    /// Session file (default: platform data dir)
    pub token_file: Option<String>,
}

fn default_redirect_uri() -> String {
    "http://localhost:5173".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            google_client_id: None,
            oauth_redirect_uri: default_redirect_uri(),
            token_file: None,
        }
    }
}

impl AuthConfig {
    /// Resolved session file location
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file
            .as_ref()
            .map(PathBuf::from)
            .or_else(crate::session::default_session_path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("advision").join("config.toml")),
            Some(PathBuf::from("/etc/advision/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("ADVISION_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("ADVISION_API_TIMEOUT") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        // Auth overrides
        if let Ok(client_id) = std::env::var("ADVISION_GOOGLE_CLIENT_ID") {
            self.auth.google_client_id = Some(client_id);
        }
        if let Ok(uri) = std::env::var("ADVISION_OAUTH_REDIRECT_URI") {
            self.auth.oauth_redirect_uri = uri;
        }
        if let Ok(path) = std::env::var("ADVISION_TOKEN_FILE") {
            self.auth.token_file = Some(path);
        }

        // Logging overrides
        if let Ok(level) = std::env::var("ADVISION_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ADVISION_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# AdVision Configuration
#
# Environment variables override these settings:
# - ADVISION_API_URL
# - ADVISION_API_TIMEOUT
# - ADVISION_GOOGLE_CLIENT_ID
# - ADVISION_OAUTH_REDIRECT_URI
# - ADVISION_TOKEN_FILE
# - ADVISION_LOG_LEVEL
# - ADVISION_LOG_FORMAT

[api]
# Backend REST API root
base_url = "http://localhost:8000/api"

# Token refresh endpoint, relative to base_url
refresh_path = "auth/token/refresh/"

# Request timeout in seconds
request_timeout_secs = 30

[auth]
# Google OAuth client ID (required for `advision google-url`)
# google_client_id = ""

# Redirect URI registered with Google
oauth_redirect_uri = "http://localhost:5173"

# Where the session tokens are kept
# token_file = "~/.local/share/advision/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ENV_KEYS: [&str; 7] = [
        "ADVISION_API_URL",
        "ADVISION_API_TIMEOUT",
        "ADVISION_GOOGLE_CLIENT_ID",
        "ADVISION_OAUTH_REDIRECT_URI",
        "ADVISION_TOKEN_FILE",
        "ADVISION_LOG_LEVEL",
        "ADVISION_LOG_FORMAT",
    ];

    /// Run `f` with only the given ADVISION_* variables set
    fn with_env<F: FnOnce()>(overrides: &[(&str, &str)], f: F) {
        let vars: Vec<(&str, Option<&str>)> = ENV_KEYS
            .iter()
            .map(|key| {
                let value = overrides.iter().find(|(k, _)| k == key).map(|(_, v)| *v);
                (*key, value)
            })
            .collect();
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.refresh_path, "auth/token/refresh/");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(config.auth.google_client_id.is_none());
        assert_eq!(config.auth.oauth_redirect_uri, "http://localhost:5173");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(config.auth.token_file.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://api.advision.example/api"

[auth]
google_client_id = "client-123.apps.googleusercontent.com"
token_file = "/tmp/advision-session.json"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://api.advision.example/api");
        assert_eq!(config.api.refresh_path, "auth/token/refresh/");
        assert_eq!(
            config.auth.google_client_id.as_deref(),
            Some("client-123.apps.googleusercontent.com")
        );
        assert_eq!(
            config.auth.token_path(),
            Some(PathBuf::from("/tmp/advision-session.json"))
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/advision.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 3").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        with_env(
            &[
                ("ADVISION_API_URL", "https://prod.example/api"),
                ("ADVISION_API_TIMEOUT", "90"),
                ("ADVISION_GOOGLE_CLIENT_ID", "gid"),
                ("ADVISION_LOG_FORMAT", "json"),
            ],
            || {
                let config = Config::from_env();
                assert_eq!(config.api.base_url, "https://prod.example/api");
                assert_eq!(config.api.request_timeout_secs, 90);
                assert_eq!(config.auth.google_client_id.as_deref(), Some("gid"));
                assert_eq!(config.logging.format, "json");
                assert_eq!(config.logging.level, "info");
            },
        );
    }

    #[test]
    fn test_invalid_timeout_override_is_ignored() {
        with_env(&[("ADVISION_API_TIMEOUT", "soon")], || {
            assert_eq!(Config::from_env().api.request_timeout_secs, 30);
        });
    }
}
