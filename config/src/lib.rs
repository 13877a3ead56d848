//! Configuration loading for Pokedex.
//!
//! Reads `~/.pokedex/config.toml`. Every section and field is optional; the
//! resolved [`ApiSettings`] and [`UiSettings`] fill in defaults so callers never
//! see an `Option`. String values may reference environment variables as
//! `${VAR}`.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;

pub use pokedex_providers::DEFAULT_ENDPOINT;
use pokedex_providers::{ClientOptions, RetryConfig};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct PokedexConfig {
    pub app: Option<AppConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Key submitted as soon as the app starts.
    pub initial_query: Option<String>,
    pub high_contrast: Option<bool>,
    pub ascii_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub delay_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub endpoint: String,
    pub timeout: Duration,
    pub delay: Duration,
    pub max_retries: u32,
}

impl ApiSettings {
    /// Options for the HTTP client built from these settings.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
            delay: self.delay,
            retry: RetryConfig::default().with_max_retries(self.max_retries),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiSettings {
    pub initial_query: String,
    pub high_contrast: bool,
    pub ascii_only: bool,
}

/// Replaces `${VAR}` with the variable's value (empty when unset).
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl PokedexConfig {
    /// Loads the user config, treating a missing or broken file as absent.
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }

        match Self::load_from(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!("{err}");
                None
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn api_settings(&self) -> ApiSettings {
        let api = self.api.as_ref();
        let endpoint = api
            .and_then(|api| api.endpoint.as_deref())
            .map(expand_env_vars)
            .map(|endpoint| endpoint.trim().to_string())
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        ApiSettings {
            endpoint,
            timeout: Duration::from_secs(
                api.and_then(|api| api.timeout_secs)
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            delay: Duration::from_millis(api.and_then(|api| api.delay_ms).unwrap_or(0)),
            max_retries: api
                .and_then(|api| api.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }

    #[must_use]
    pub fn ui_settings(&self) -> UiSettings {
        let app = self.app.as_ref();
        UiSettings {
            initial_query: app
                .and_then(|app| app.initial_query.as_deref())
                .map(expand_env_vars)
                .unwrap_or_default(),
            high_contrast: app.and_then(|app| app.high_contrast).unwrap_or(false),
            ascii_only: app.and_then(|app| app.ascii_only).unwrap_or(false),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pokedex").join("config.toml"))
}
