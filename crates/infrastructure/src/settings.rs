//! Gateway configuration.
//!
//! Loaded with the `config` crate from an optional `bankline.toml` and
//! environment variables prefixed with `BANKLINE`, using `__` between
//! sections (for example `BANKLINE__API__BASE_URL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use bankline_application::AuthRoutes;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use url::Url;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "bankline";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "BANKLINE";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Sources could not be read or merged.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid api.base_url '{url}': {reason}")]
    InvalidBaseUrl {
        /// The configured value.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Banking API connection.
    pub api: ApiSettings,
    /// Auth endpoints and session policy.
    #[serde(default)]
    pub auth: AuthSettings,
    /// Token store location.
    #[serde(default)]
    pub store: StoreSettings,
    /// Log filter.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Banking API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every request path is resolved against.
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Auth endpoint paths and session policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Token refresh endpoint.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Login endpoint.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Logout endpoint.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Where the user is sent when the session ends.
    #[serde(default = "default_login_location")]
    pub login_location: String,
    /// Seconds before expiry a token counts as expiring.
    #[serde(default = "default_expiry_buffer_secs")]
    pub expiry_buffer_secs: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            login_location: default_login_location(),
            expiry_buffer_secs: default_expiry_buffer_secs(),
        }
    }
}

/// Token store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Session file.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from `path` (or `bankline.toml` if present) and
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, a value has the wrong
    /// type, `api.base_url` is missing, or the base URL is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Self::build(
            Config::builder().add_source(file).add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            ),
        )
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn from_toml(text: &str) -> Result<Self, SettingsError> {
        Self::build(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.base_url()?;
        Ok(config)
    }

    /// The validated API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error unless the URL is absolute with an `http` or
    /// `https` scheme.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let invalid = |reason: String| SettingsError::InvalidBaseUrl {
            url: self.api.base_url.clone(),
            reason,
        };

        let url = Url::parse(&self.api.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            "http" | "https" => Err(invalid("missing host".to_string())),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Auth endpoint paths for the gateway.
    #[must_use]
    pub fn routes(&self) -> AuthRoutes {
        AuthRoutes {
            refresh: self.auth.refresh_path.clone(),
            login: self.auth.login_path.clone(),
            logout: self.auth.logout_path.clone(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("bankline/{}", env!("CARGO_PKG_VERSION"))
}

fn default_refresh_path() -> String {
    "/auth/refresh".to_string()
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_logout_path() -> String {
    "/auth/logout".to_string()
}

fn default_login_location() -> String {
    "/login".to_string()
}

const fn default_expiry_buffer_secs() -> i64 {
    60
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".bankline/session.json")
}

fn default_log_level() -> String {
    "info".to_string()
}
