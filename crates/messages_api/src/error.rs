use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Closed classification used by the retry policy and by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Missing or malformed credential or client settings.
    Configuration,
    Authentication,
    RateLimited,
    ConnectTimeout,
    ReadTimeout,
    /// Connection refused or host unreachable.
    ConnectionFailed,
    /// Other transport failures, unexpected statuses and malformed responses.
    Unclassified,
}

impl FailureKind {
    /// Returns true when retrying the unchanged request may succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::ConnectTimeout | Self::ReadTimeout | Self::ConnectionFailed | Self::Unclassified
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::ConnectTimeout => "connect_timeout",
            Self::ReadTimeout => "read_timeout",
            Self::ConnectionFailed => "connection_failed",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MessagesApiError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("connection timed out: {0}")]
    ConnectTimeout(#[source] reqwest::Error),

    #[error("timed out waiting for response: {0}")]
    ReadTimeout(#[source] reqwest::Error),

    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),

    #[error("authentication failed (HTTP {status}): {message}")]
    Authentication { status: StatusCode, message: String },

    #[error("rate limited (HTTP {status}): {message}")]
    RateLimited { status: StatusCode, message: String },

    #[error("HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("response contained no text content block")]
    EmptyContent,

    #[error("retry exhausted after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<MessagesApiError>,
    },
}

impl MessagesApiError {
    /// Classifies a transport-level failure by what the client was doing.
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() && error.is_timeout() {
            Self::ConnectTimeout(error)
        } else if error.is_timeout() {
            Self::ReadTimeout(error)
        } else if error.is_connect() {
            Self::Connect(error)
        } else {
            Self::Request(error)
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::MissingApiKey
            | Self::InvalidConfig(_)
            | Self::InvalidHeader { .. }
            | Self::ClientBuild(_) => FailureKind::Configuration,
            Self::ConnectTimeout(_) => FailureKind::ConnectTimeout,
            Self::ReadTimeout(_) => FailureKind::ReadTimeout,
            Self::Connect(_) => FailureKind::ConnectionFailed,
            Self::Authentication { .. } => FailureKind::Authentication,
            Self::RateLimited { .. } => FailureKind::RateLimited,
            Self::Request(_) | Self::Status { .. } | Self::Decode(_) | Self::EmptyContent => {
                FailureKind::Unclassified
            }
            Self::RetryExhausted { last, .. } => last.failure_kind(),
        }
    }

    /// Number of attempts made when this error ended a retry loop.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::RetryExhausted { attempts, .. } => *attempts,
            _ => 1,
        }
    }

    /// Innermost error, skipping the retry-exhaustion wrapper.
    pub fn root(&self) -> &MessagesApiError {
        match self {
            Self::RetryExhausted { last, .. } => last.root(),
            other => other,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    pub error: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub message: Option<String>,
}

fn authentication_body_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)authentication|invalid.?x-api-key|invalid.?api.?key|unauthori[sz]ed")
            .expect("authentication regex must compile")
    })
}

fn rate_limit_body_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"(?i)rate.?limit|too many requests").expect("rate limit regex must compile")
    })
}

/// Maps a non-success HTTP response to a classified error.
///
/// Structured `{"error": {"type": ...}}` bodies decide first; raw bodies from
/// intermediaries fall back to text patterns.
pub fn error_for_status(status: StatusCode, body: &str) -> MessagesApiError {
    let message = parse_error_message(status, body);
    let error_type = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|error| error.type_);

    let is_auth = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || match error_type.as_deref() {
            Some(kind) => matches!(kind, "authentication_error" | "permission_error"),
            None => authentication_body_regex().is_match(body),
        };
    if is_auth {
        return MessagesApiError::Authentication { status, message };
    }

    let is_rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || match error_type.as_deref() {
            Some(kind) => kind == "rate_limit_error",
            None => rate_limit_body_regex().is_match(body),
        };
    if is_rate_limited {
        return MessagesApiError::RateLimited { status, message };
    }

    MessagesApiError::Status { status, message }
}

pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let explicit = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.error)
        .and_then(|error| error.message)
        .filter(|message| !message.trim().is_empty());
    if let Some(message) = explicit {
        return message;
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}
