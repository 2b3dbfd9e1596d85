use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use messages_api::{MessagesApiConfig, RetryPolicy};
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV_VAR: &str = "CREW_DEBUGGER_CONFIG_PATH";
pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config field `{field}` must be > 0")]
    NotPositive { field: &'static str },

    #[error("config field `{field}` must not be blank")]
    Blank { field: &'static str },

    #[error("API key not found; set {API_KEY_ENV_VAR} or `api_key` in the config file")]
    MissingApiKey,
}

/// Optional overrides read from the JSON file named by
/// `CREW_DEBUGGER_CONFIG_PATH`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub connect_timeout_sec: Option<u64>,
    #[serde(default)]
    pub request_timeout_sec: Option<u64>,
    #[serde(default)]
    pub retry_attempts: Option<u32>,
    #[serde(default)]
    pub retry_delay_sec: Option<u64>,
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("connect_timeout_sec", &self.connect_timeout_sec)
            .field("request_timeout_sec", &self.request_timeout_sec)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay_sec", &self.retry_delay_sec)
            .finish()
    }
}

impl CliConfig {
    /// Loads the file named by `CREW_DEBUGGER_CONFIG_PATH`, or defaults when
    /// the variable is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        match path {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("max_tokens", self.max_tokens.map(u64::from))?;
        require_positive("connect_timeout_sec", self.connect_timeout_sec)?;
        require_positive("request_timeout_sec", self.request_timeout_sec)?;
        require_positive("retry_attempts", self.retry_attempts.map(u64::from))?;
        require_positive("retry_delay_sec", self.retry_delay_sec)?;
        require_non_blank("base_url", self.base_url.as_deref())?;
        require_non_blank("model", self.model.as_deref())?;
        Ok(())
    }

    /// File key first, then `env_key`; blank values count as absent.
    pub fn resolve_api_key(&self, env_key: Option<String>) -> Result<String, ConfigError> {
        self.api_key
            .iter()
            .cloned()
            .chain(env_key)
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn messages_api_config(
        &self,
        env_key: Option<String>,
    ) -> Result<MessagesApiConfig, ConfigError> {
        let mut config = MessagesApiConfig::new(self.resolve_api_key(env_key)?);

        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.trim());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.trim());
        }
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }

        let connect = self
            .connect_timeout_sec
            .map_or(config.connect_timeout, Duration::from_secs);
        let request = self
            .request_timeout_sec
            .map_or(config.request_timeout, Duration::from_secs);
        config = config.with_timeouts(connect, request);

        let attempts = self
            .retry_attempts
            .unwrap_or_else(|| config.retry.max_attempts());
        let delay = self
            .retry_delay_sec
            .map_or(config.retry.delay(), Duration::from_secs);
        Ok(config.with_retry_policy(RetryPolicy::new(attempts, delay)))
    }
}

fn require_positive(field: &'static str, value: Option<u64>) -> Result<(), ConfigError> {
    match value {
        Some(0) => Err(ConfigError::NotPositive { field }),
        _ => Ok(()),
    }
}

fn require_non_blank(field: &'static str, value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Blank { field }),
        _ => Ok(()),
    }
}
