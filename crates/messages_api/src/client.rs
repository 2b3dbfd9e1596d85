use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client};

use crate::config::MessagesApiConfig;
use crate::error::{error_for_status, MessagesApiError};
use crate::headers::build_headers;
use crate::payload::{MessagesRequest, MessagesResponse};
use crate::retry::{retry_with_policy, RetryNotice, RetryPolicy, Sleep, TokioSleep};
use crate::url::normalize_messages_url;

/// One attempt against a Messages endpoint, without retries.
pub trait MessagesTransport: Send + Sync {
    fn send_attempt<'a>(
        &'a self,
        request: &'a MessagesRequest,
    ) -> BoxFuture<'a, Result<MessagesResponse, MessagesApiError>>;
}

#[derive(Debug)]
pub struct MessagesApiClient {
    http: Client,
    config: MessagesApiConfig,
}

impl MessagesApiClient {
    /// Builds a pooled client with connect/request timeouts and verified TLS.
    pub fn new(config: MessagesApiConfig) -> Result<Self, MessagesApiError> {
        config.validate()?;

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(MessagesApiError::ClientBuild)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &MessagesApiConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        normalize_messages_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, MessagesApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            let name =
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| MessagesApiError::InvalidHeader {
                    name: key.clone(),
                    reason: "invalid header name".to_owned(),
                })?;
            let value = HeaderValue::from_str(&value).map_err(|_| MessagesApiError::InvalidHeader {
                name: key.clone(),
                reason: "invalid header value".to_owned(),
            })?;
            out.insert(name, value);
        }
        Ok(out)
    }

    /// Request body with the configured model and token limit.
    pub fn request_for(&self, system: impl Into<String>) -> MessagesRequest {
        MessagesRequest::new(self.config.model.clone(), self.config.max_tokens).with_system(system)
    }

    pub fn build_request(
        &self,
        request: &MessagesRequest,
    ) -> Result<reqwest::RequestBuilder, MessagesApiError> {
        let headers = self.build_headers()?;
        Ok(self.http.post(self.endpoint()).headers(headers).json(request))
    }

    /// Sends one attempt and classifies any failure.
    pub async fn send_once(
        &self,
        request: &MessagesRequest,
    ) -> Result<MessagesResponse, MessagesApiError> {
        let response = self
            .build_request(request)?
            .send()
            .await
            .map_err(MessagesApiError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(MessagesApiError::from_transport)?;
        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }

        serde_json::from_str(&body).map_err(MessagesApiError::Decode)
    }

    /// Sends with the configured retry policy and real sleeps.
    pub async fn send_with_retry(
        &self,
        request: &MessagesRequest,
        on_retry: impl FnMut(RetryNotice<'_>),
    ) -> Result<String, MessagesApiError> {
        send_with_retry(self, request, &self.config.retry, &TokioSleep, on_retry).await
    }
}

impl MessagesTransport for MessagesApiClient {
    fn send_attempt<'a>(
        &'a self,
        request: &'a MessagesRequest,
    ) -> BoxFuture<'a, Result<MessagesResponse, MessagesApiError>> {
        Box::pin(self.send_once(request))
    }
}

/// Sends `request` until a text reply arrives or the policy gives up.
///
/// A response without a text block counts as a failed attempt.
pub async fn send_with_retry(
    transport: &dyn MessagesTransport,
    request: &MessagesRequest,
    policy: &RetryPolicy,
    sleeper: &dyn Sleep,
    on_retry: impl FnMut(RetryNotice<'_>),
) -> Result<String, MessagesApiError> {
    retry_with_policy(policy, sleeper, on_retry, |attempt| async move {
        tracing::debug!(attempt, messages = request.messages.len(), "sending messages request");
        let response = transport.send_attempt(request).await?;
        response
            .first_text()
            .map(str::to_owned)
            .ok_or(MessagesApiError::EmptyContent)
    })
    .await
}
