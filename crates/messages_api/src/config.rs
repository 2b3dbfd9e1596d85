use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::MessagesApiError;
use crate::retry::RetryPolicy;
use crate::url::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";
/// Slow connection setup is usually recoverable by retrying.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Bounds the whole request, including generation time.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 5;
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Transport configuration for Messages API requests.
#[derive(Clone)]
pub struct MessagesApiConfig {
    /// Credential sent as `x-api-key`.
    pub api_key: String,
    /// Base URL for the Messages endpoint.
    pub base_url: String,
    pub model: String,
    /// Upper bound on generated output tokens.
    pub max_tokens: u32,
    pub anthropic_version: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub max_redirects: usize,
    pub retry: RetryPolicy,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for MessagesApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_version: DEFAULT_ANTHROPIC_VERSION.to_string(),
            user_agent: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            retry: RetryPolicy::default(),
            extra_headers: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for MessagesApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagesApiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("anthropic_version", &self.anthropic_version)
            .field("user_agent", &self.user_agent)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("max_redirects", &self.max_redirects)
            .field("retry", &self.retry)
            .field("extra_headers", &self.extra_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MessagesApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, request_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Checks invariants that cannot be expressed in the field types.
    ///
    /// The API key is deliberately not checked here: a missing credential is
    /// reported per request as a configuration failure.
    pub fn validate(&self) -> Result<(), MessagesApiError> {
        if self.model.trim().is_empty() {
            return Err(MessagesApiError::InvalidConfig(
                "model identifier must not be blank".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(MessagesApiError::InvalidConfig(
                "max_tokens must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(MessagesApiError::InvalidConfig(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.connect_timeout >= self.request_timeout {
            return Err(MessagesApiError::InvalidConfig(format!(
                "connect timeout ({:?}) must be shorter than request timeout ({:?})",
                self.connect_timeout, self.request_timeout
            )));
        }
        if self.retry.max_attempts() == 0 {
            return Err(MessagesApiError::InvalidConfig(
                "retry policy must allow at least one attempt".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generation_contract() {
        let config = MessagesApiConfig::new("key");

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 8000);
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.pool_max_idle_per_host, 5);
        assert_eq!(config.retry.max_attempts(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_connect_timeout_not_shorter_than_request_timeout() {
        let config = MessagesApiConfig::new("key")
            .with_timeouts(Duration::from_secs(30), Duration::from_secs(30));

        let error = config.validate().expect_err("equal timeouts must fail");
        assert!(error.to_string().contains("must be shorter"));
    }

    #[test]
    fn validate_rejects_blank_model_and_zero_attempts() {
        assert!(MessagesApiConfig::new("key")
            .with_model("  ")
            .validate()
            .is_err());
        assert!(MessagesApiConfig::new("key")
            .with_retry_policy(RetryPolicy::new(0, Duration::ZERO))
            .validate()
            .is_err());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let rendered = format!("{:?}", MessagesApiConfig::new("sk-ant-secret"));
        assert!(!rendered.contains("sk-ant-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
