use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;

use crew_debugger::{SessionController, SessionEvent, SessionRejection, SessionState, TurnOutcome};
use generation_client::{
    ClientProfile, GenerationClient, GenerationError, GenerationEvent, GenerationRequest,
};

mod support;

use support::{lock_unpoisoned, mandatory_artifacts};

/// Blocks every call until the test releases it with a reply.
struct GatedClient {
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<Result<String, GenerationError>>>,
}

impl GenerationClient for GatedClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            provider_id: "gated".to_string(),
            model_id: "gated-model".to_string(),
        }
    }

    fn send(
        &self,
        _request: GenerationRequest,
        _emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<String, GenerationError> {
        lock_unpoisoned(&self.entered)
            .send(())
            .expect("test should wait for call entry");
        lock_unpoisoned(&self.release)
            .recv()
            .expect("test should release the call")
    }
}

struct Harness {
    controller: Arc<SessionController>,
    entered: Receiver<()>,
    release: Sender<Result<String, GenerationError>>,
}

fn harness() -> Harness {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let client = Arc::new(GatedClient {
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });

    Harness {
        controller: Arc::new(SessionController::new(client, "system")),
        entered: entered_rx,
        release: release_tx,
    }
}

fn submit_in_background(
    controller: &Arc<SessionController>,
) -> thread::JoinHandle<(Result<TurnOutcome, SessionRejection>, Vec<SessionEvent>)> {
    let controller = Arc::clone(controller);
    thread::spawn(move || {
        let mut events = Vec::new();
        let outcome =
            controller.submit_artifacts(mandatory_artifacts(), &mut |event| events.push(event));
        (outcome, events)
    })
}

#[test]
fn concurrent_triggers_are_rejected_while_call_is_in_flight() {
    let harness = harness();
    let worker = submit_in_background(&harness.controller);
    harness
        .entered
        .recv_timeout(Duration::from_secs(5))
        .expect("call should start");

    let controller = &harness.controller;
    assert_eq!(
        controller.state(),
        SessionState::InProgress { initial: true }
    );
    assert_eq!(
        controller.send_message("are you there?", &mut |_| {}),
        Err(SessionRejection::Busy)
    );
    assert_eq!(
        controller.retry_initial(&mut |_| {}),
        Err(SessionRejection::Busy)
    );
    assert_eq!(
        controller.submit_artifacts(mandatory_artifacts(), &mut |_| {}),
        Err(SessionRejection::AlreadyStarted)
    );
    assert!(controller.turns().is_empty());

    harness
        .release
        .send(Ok("analysis".to_string()))
        .expect("worker waiting");
    let (outcome, events) = worker.join().expect("worker thread");

    assert_matches!(outcome, Ok(TurnOutcome::Completed { reply }) if reply == "analysis");
    assert!(events.is_empty());
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.turns().len(), 2);
}

#[test]
fn reset_during_call_discards_late_result() {
    let harness = harness();
    let worker = submit_in_background(&harness.controller);
    harness
        .entered
        .recv_timeout(Duration::from_secs(5))
        .expect("call should start");

    harness.controller.reset();
    assert_eq!(harness.controller.state(), SessionState::Empty);

    harness
        .release
        .send(Err(GenerationError::new(
            generation_client::ErrorKind::ReadTimeout,
            "late failure",
        )))
        .expect("worker waiting");
    let (outcome, events) = worker.join().expect("worker thread");

    assert_eq!(outcome, Ok(TurnOutcome::Superseded));
    assert!(events.is_empty());
    assert_eq!(harness.controller.state(), SessionState::Empty);
    assert!(harness.controller.turns().is_empty());
}
