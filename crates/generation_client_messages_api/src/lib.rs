//! Messages API-backed implementation of the shared `generation_client` contract.
//!
//! This adapter owns a small tokio runtime so that the blocking
//! [`GenerationClient::send`] boundary can drive the async `messages_api`
//! retry loop. Classified transport failures are turned into
//! [`GenerationError`]s whose messages are ready to show to a user.

pub mod messages;

use std::sync::Arc;

use generation_client::{
    ChatMessage, ClientInitError, ClientProfile, ErrorKind, GenerationClient, GenerationError,
    GenerationEvent, GenerationRequest, Role,
};
use messages_api::{
    send_with_retry, FailureKind, MessageRole, MessagesApiClient, MessagesApiConfig,
    MessagesApiError, MessagesRequest, MessagesTransport, RetryPolicy, Sleep, TokioSleep,
};
use tokio::runtime::Runtime;

use crate::messages::{failure_message, retry_warning};

/// Stable provider identifier reported in [`ClientProfile`].
pub const MESSAGES_API_PROVIDER_ID: &str = "anthropic-messages";

/// `GenerationClient` adapter backed by `messages_api` transport primitives.
pub struct MessagesApiGenerationClient {
    runtime: Runtime,
    transport: Arc<dyn MessagesTransport>,
    sleeper: Arc<dyn Sleep>,
    policy: RetryPolicy,
    model: String,
    max_tokens: u32,
}

impl MessagesApiGenerationClient {
    /// Creates a client using the real HTTP transport.
    pub fn new(config: MessagesApiConfig) -> Result<Self, ClientInitError> {
        let client = MessagesApiClient::new(config.clone()).map_err(map_init_error)?;
        Self::with_transport(Arc::new(client), Arc::new(TokioSleep), &config)
    }

    /// Creates a client over any transport; model, token limit and retry
    /// policy are taken from `config`.
    pub fn with_transport(
        transport: Arc<dyn MessagesTransport>,
        sleeper: Arc<dyn Sleep>,
        config: &MessagesApiConfig,
    ) -> Result<Self, ClientInitError> {
        config.validate().map_err(map_init_error)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("messages-api")
            .enable_all()
            .build()
            .map_err(|error| {
                ClientInitError::new(format!("failed to initialize tokio runtime: {error}"))
            })?;

        Ok(Self {
            runtime,
            transport,
            sleeper,
            policy: config.retry,
            model: config.model.trim().to_string(),
            max_tokens: config.max_tokens,
        })
    }

    fn build_request(&self, request: GenerationRequest) -> MessagesRequest {
        let mut payload = MessagesRequest::new(self.model.clone(), self.max_tokens)
            .with_system(request.system_instruction);
        for ChatMessage { role, content } in request.messages {
            payload = payload.push(map_role(role), content);
        }
        payload
    }
}

impl GenerationClient for MessagesApiGenerationClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            provider_id: MESSAGES_API_PROVIDER_ID.to_string(),
            model_id: self.model.clone(),
        }
    }

    fn send(
        &self,
        request: GenerationRequest,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<String, GenerationError> {
        let payload = self.build_request(request);
        let result = self.runtime.block_on(send_with_retry(
            self.transport.as_ref(),
            &payload,
            &self.policy,
            self.sleeper.as_ref(),
            |notice| {
                let kind = map_failure_kind(notice.kind);
                emit(GenerationEvent::RetryScheduled {
                    attempt: notice.attempt,
                    kind,
                    delay: notice.delay,
                    message: retry_warning(kind, notice.attempt, notice.delay),
                });
            },
        ));

        result.map_err(|error| map_terminal_error(&error))
    }
}

fn map_terminal_error(error: &MessagesApiError) -> GenerationError {
    let kind = map_failure_kind(error.failure_kind());
    tracing::error!(kind = %kind, attempts = error.attempts(), error = %error, "generation failed");
    GenerationError::new(kind, failure_message(kind, error))
}

fn map_role(role: Role) -> MessageRole {
    match role {
        Role::User => MessageRole::User,
        Role::Assistant => MessageRole::Assistant,
    }
}

/// Maps transport classification onto the provider-neutral kind.
pub fn map_failure_kind(kind: FailureKind) -> ErrorKind {
    match kind {
        FailureKind::Configuration => ErrorKind::Configuration,
        FailureKind::Authentication => ErrorKind::Authentication,
        FailureKind::RateLimited => ErrorKind::RateLimited,
        FailureKind::ConnectTimeout => ErrorKind::ConnectTimeout,
        FailureKind::ReadTimeout => ErrorKind::ReadTimeout,
        FailureKind::ConnectionFailed => ErrorKind::ConnectionFailed,
        FailureKind::Unclassified => ErrorKind::Unclassified,
    }
}

fn map_init_error(error: MessagesApiError) -> ClientInitError {
    ClientInitError::new(format!(
        "Failed to initialize messages-api client: {error}"
    ))
}
