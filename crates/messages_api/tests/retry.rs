use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use assert_matches::assert_matches;
use futures_util::future::BoxFuture;
use reqwest::StatusCode;

use messages_api::error::error_for_status;
use messages_api::{
    send_with_retry, ContentBlock, FailureKind, MessageRole, MessagesApiError, MessagesRequest,
    MessagesResponse, MessagesTransport, RetryPolicy, Sleep,
};

#[derive(Default)]
struct RecordingSleep {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleep {
    fn slept(&self) -> Vec<Duration> {
        self.slept.lock().expect("sleep log").clone()
    }
}

impl Sleep for RecordingSleep {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.slept.lock().expect("sleep log").push(duration);
        Box::pin(async {})
    }
}

struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<MessagesResponse, MessagesApiError>>>,
    calls: Mutex<u32>,
}

impl ScriptedTransport {
    fn new(outcomes: Vec<Result<MessagesResponse, MessagesApiError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().expect("call count")
    }
}

impl MessagesTransport for ScriptedTransport {
    fn send_attempt<'a>(
        &'a self,
        _request: &'a MessagesRequest,
    ) -> BoxFuture<'a, Result<MessagesResponse, MessagesApiError>> {
        *self.calls.lock().expect("call count") += 1;
        let next = self
            .outcomes
            .lock()
            .expect("outcomes")
            .pop_front()
            .expect("transport called more often than scripted");
        Box::pin(async move { next })
    }
}

fn text_response(text: &str) -> MessagesResponse {
    MessagesResponse {
        id: None,
        model: None,
        stop_reason: Some("end_turn".to_owned()),
        content: vec![ContentBlock {
            block_type: "text".to_owned(),
            text: Some(text.to_owned()),
        }],
    }
}

fn server_error() -> MessagesApiError {
    error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

fn request() -> MessagesRequest {
    MessagesRequest::new("model", 16).push(MessageRole::User, "hello")
}

#[tokio::test]
async fn retry_recovers_after_transient_failures() {
    let transport =
        ScriptedTransport::new(vec![Err(server_error()), Err(server_error()), Ok(text_response("ok"))]);
    let sleeper = RecordingSleep::default();
    let mut notices = Vec::new();

    let reply = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::default(),
        &sleeper,
        |notice| notices.push((notice.attempt, notice.kind)),
    )
    .await
    .expect("third attempt succeeds");

    assert_eq!(reply, "ok");
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        notices,
        vec![(1, FailureKind::Unclassified), (2, FailureKind::Unclassified)]
    );
    assert_eq!(sleeper.slept(), vec![Duration::from_secs(3); 2]);
}

#[tokio::test]
async fn retry_exhaustion_wraps_last_failure_after_three_attempts() {
    let transport =
        ScriptedTransport::new(vec![Err(server_error()), Err(server_error()), Err(server_error())]);
    let sleeper = RecordingSleep::default();

    let error = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::default(),
        &sleeper,
        |_| {},
    )
    .await
    .expect_err("all attempts fail");

    assert_matches!(error, MessagesApiError::RetryExhausted { attempts: 3, .. });
    assert_eq!(error.failure_kind(), FailureKind::Unclassified);
    assert_eq!(transport.calls(), 3);
    assert_eq!(sleeper.slept().len(), 2);
}

#[tokio::test]
async fn authentication_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(error_for_status(
        StatusCode::UNAUTHORIZED,
        "",
    ))]);
    let sleeper = RecordingSleep::default();
    let mut notices = 0;

    let error = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::default(),
        &sleeper,
        |_| notices += 1,
    )
    .await
    .expect_err("401 is terminal");

    assert_matches!(error, MessagesApiError::Authentication { .. });
    assert_eq!(transport.calls(), 1);
    assert_eq!(notices, 0);
    assert!(sleeper.slept().is_empty());
}

#[tokio::test]
async fn rate_limit_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Err(error_for_status(
        StatusCode::TOO_MANY_REQUESTS,
        "",
    ))]);
    let sleeper = RecordingSleep::default();

    let error = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::default(),
        &sleeper,
        |_| {},
    )
    .await
    .expect_err("429 is terminal");

    assert_eq!(error.failure_kind(), FailureKind::RateLimited);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn response_without_text_counts_as_failed_attempt() {
    let empty = MessagesResponse {
        id: None,
        model: None,
        stop_reason: None,
        content: Vec::new(),
    };
    let transport = ScriptedTransport::new(vec![Ok(empty), Ok(text_response("recovered"))]);
    let sleeper = RecordingSleep::default();

    let reply = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::new(3, Duration::from_millis(5)),
        &sleeper,
        |notice| assert_matches!(notice.error, MessagesApiError::EmptyContent),
    )
    .await
    .expect("second attempt succeeds");

    assert_eq!(reply, "recovered");
    assert_eq!(sleeper.slept(), vec![Duration::from_millis(5)]);
}

#[tokio::test]
async fn single_attempt_policy_returns_transient_failure_unwrapped() {
    let transport = ScriptedTransport::new(vec![Err(server_error())]);
    let sleeper = RecordingSleep::default();

    let error = send_with_retry(
        &transport,
        &request(),
        &RetryPolicy::new(1, Duration::ZERO),
        &sleeper,
        |_| {},
    )
    .await
    .expect_err("only one attempt allowed");

    assert_matches!(error, MessagesApiError::Status { .. });
}
