//! Minimal provider-agnostic contract for one text-generation call.
//!
//! This crate defines only the request/response boundary shared by the session
//! core and concrete transports. It carries no HTTP details, no retry loop and
//! no conversation state: a client receives the full ordered history on every
//! call and returns the assistant text or a classified failure.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of one conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-style generation endpoints.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Role that must follow this one in a well-formed conversation.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::User => Self::Assistant,
            Self::Assistant => Self::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp-free message as transmitted to a generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Ordered history ending with the pending user message.
    pub messages: Vec<ChatMessage>,
    /// Instruction attached to every call; never part of the history.
    pub system_instruction: String,
}

/// Closed classification of generation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credential missing or malformed before any request was made.
    Configuration,
    /// Credential rejected by the provider.
    Authentication,
    RateLimited,
    ConnectTimeout,
    ReadTimeout,
    /// Connection refused or host unreachable.
    ConnectionFailed,
    /// Any other transport failure or upstream contract violation.
    Unclassified,
}

impl ErrorKind {
    #[must_use]
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

    /// Returns true for kinds that a retry with the same request may resolve.
    #[must_use]
    pub fn is_transient(self) -> bool {
        match self {
            Self::ConnectTimeout | Self::ReadTimeout | Self::ConnectionFailed | Self::Unclassified => {
                true
            }
            Self::Configuration | Self::Authentication | Self::RateLimited => false,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of one generation call, already phrased for the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl GenerationError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Error returned while constructing a client before any call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientInitError {
    message: String,
}

impl ClientInitError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ClientInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ClientInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Non-terminal progress reported while a call is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// Attempt `attempt` (1-based) failed and another attempt follows after `delay`.
    RetryScheduled {
        attempt: u32,
        kind: ErrorKind,
        delay: Duration,
        message: String,
    },
}

/// Immutable metadata describing a generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Blocking request/response boundary to a text-generation provider.
///
/// Implementations must not retain conversation state between calls.
pub trait GenerationClient: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ClientProfile;

    /// Sends one request and returns the first text segment of the reply.
    ///
    /// Retry warnings are reported through `emit` in attempt order before the
    /// call resolves.
    fn send(
        &self,
        request: GenerationRequest,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    impl GenerationClient for EchoClient {
        fn profile(&self) -> ClientProfile {
            ClientProfile {
                provider_id: "echo".to_string(),
                model_id: "echo-model".to_string(),
            }
        }

        fn send(
            &self,
            request: GenerationRequest,
            _emit: &mut dyn FnMut(GenerationEvent),
        ) -> Result<String, GenerationError> {
            request
                .messages
                .last()
                .map(|message| message.content.clone())
                .ok_or_else(|| GenerationError::new(ErrorKind::Unclassified, "empty history"))
        }
    }

    #[test]
    fn role_serializes_to_lowercase_wire_names() {
        let message = ChatMessage::assistant("done");
        let json = serde_json::to_value(&message).expect("serialize chat message");

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "done");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn role_next_alternates() {
        assert_eq!(Role::User.next(), Role::Assistant);
        assert_eq!(Role::Assistant.next(), Role::User);
    }

    #[test]
    fn transient_kinds_exclude_credential_and_rate_limit_failures() {
        assert!(ErrorKind::ConnectTimeout.is_transient());
        assert!(ErrorKind::ReadTimeout.is_transient());
        assert!(ErrorKind::ConnectionFailed.is_transient());
        assert!(ErrorKind::Unclassified.is_transient());

        assert!(!ErrorKind::Configuration.is_transient());
        assert!(!ErrorKind::Authentication.is_transient());
        assert!(!ErrorKind::RateLimited.is_transient());
    }

    #[test]
    fn generation_error_displays_user_message() {
        let error = GenerationError::new(ErrorKind::RateLimited, "slow down");
        assert_eq!(error.to_string(), "slow down");
        assert_eq!(error.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn client_init_error_preserves_message() {
        let error = ClientInitError::from("bad timeout");
        assert_eq!(error.message(), "bad timeout");
        assert_eq!(error.to_string(), "bad timeout");
    }

    #[test]
    fn client_receives_full_history_and_instruction() {
        let client = EchoClient;
        let request = GenerationRequest {
            messages: vec![
                ChatMessage::user("first"),
                ChatMessage::assistant("reply"),
                ChatMessage::user("second"),
            ],
            system_instruction: "be brief".to_string(),
        };

        let reply = client
            .send(request, &mut |_| panic!("echo client never retries"))
            .expect("echo should succeed");
        assert_eq!(reply, "second");
        assert_eq!(client.profile().provider_id, "echo");
    }
}
