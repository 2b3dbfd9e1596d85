//! Transport-only client for the Anthropic Messages endpoint.
//!
//! This crate owns request building, response parsing, failure classification
//! and the retry policy for one non-streaming generation call. It contains no
//! conversation state and no user-facing wording; callers map
//! [`FailureKind`] to whatever their surface needs.
//!
//! Retries are driven by [`retry::retry_with_policy`], which is independent of
//! the HTTP transport so the loop can be exercised with scripted attempts and a
//! non-sleeping [`retry::Sleep`] implementation.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod url;

pub use client::{send_with_retry, MessagesApiClient, MessagesTransport};
pub use config::MessagesApiConfig;
pub use error::{FailureKind, MessagesApiError};
pub use payload::{ContentBlock, MessageParam, MessageRole, MessagesRequest, MessagesResponse};
pub use retry::{RetryDecision, RetryNotice, RetryPolicy, Sleep, TokioSleep};
pub use url::normalize_messages_url;

pub use reqwest::StatusCode;
