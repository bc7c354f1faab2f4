//! Startup configuration.
//!
//! Layered once at boot: built-in defaults → YAML file → `DEVCAMPER_*`
//! environment variables (nested keys separated by `__`, e.g.
//! `DEVCAMPER_RATE_LIMIT__MAX_REQUESTS=500`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use devcamper_observability::LogFormat;

/// Default location of the YAML layer.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Environment variable naming an alternative YAML file.
pub const CONFIG_PATH_VAR: &str = "DEVCAMPER_CONFIG";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn log_format(self) -> LogFormat {
        match self {
            Self::Development => LogFormat::Pretty,
            Self::Production => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 600,
            max_requests: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Largest accepted photo, in bytes.
    pub max_file_upload: u64,
    pub file_upload_path: PathBuf,
    pub public_dir: PathBuf,
    pub rate_limit: RateLimitConfig,
    /// JSON file of known addresses for the geocoder.
    pub geocoder_fixtures: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_url: None,
            jwt_secret: "dev-secret".to_string(),
            max_file_upload: 1_000_000,
            file_upload_path: PathBuf::from("./public/uploads"),
            public_dir: PathBuf::from("./public"),
            rate_limit: RateLimitConfig::default(),
            geocoder_fixtures: None,
        }
    }
}

impl AppConfig {
    /// Load from the file named by `DEVCAMPER_CONFIG` (or the default path) and the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_layered(path)
    }

    /// defaults → YAML → environment. A missing YAML file is skipped.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let figment = Self::file_layers(config_path.as_ref()).merge(Env::prefixed("DEVCAMPER_").split("__"));
        figment
            .extract()
            .with_context(|| format!("Failed to load config (file: {})", config_path.as_ref().display()))
    }

    fn file_layers(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Yaml::file(config_path))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
