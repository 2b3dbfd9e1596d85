#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use conversation_log::Clock;
use crew_debugger::{ArtifactSlot, ArtifactStore, SessionEvent};
use generation_client::{
    ClientProfile, ErrorKind, GenerationClient, GenerationError, GenerationEvent,
    GenerationRequest,
};
use time::macros::datetime;
use time::OffsetDateTime;

/// Clock that advances one second per reading, starting at a fixed instant.
#[derive(Debug, Default)]
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> OffsetDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        datetime!(2025-03-14 09:30:00 UTC) + time::Duration::seconds(tick)
    }
}

pub enum Scripted {
    Reply(String),
    Fail(ErrorKind, String),
    /// Emits `n` retry warnings before replying.
    RetryThenReply(u32, String),
}

/// Generation client that replays scripted outcomes and records requests.
#[derive(Default)]
pub struct ScriptedClient {
    outcomes: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub fn new(outcomes: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        lock_unpoisoned(&self.requests).clone()
    }

    pub fn calls(&self) -> usize {
        lock_unpoisoned(&self.requests).len()
    }
}

impl GenerationClient for ScriptedClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            provider_id: "scripted".to_string(),
            model_id: "scripted-model".to_string(),
        }
    }

    fn send(
        &self,
        request: GenerationRequest,
        emit: &mut dyn FnMut(GenerationEvent),
    ) -> Result<String, GenerationError> {
        lock_unpoisoned(&self.requests).push(request);
        match lock_unpoisoned(&self.outcomes).pop_front() {
            Some(Scripted::Reply(text)) => Ok(text),
            Some(Scripted::Fail(kind, message)) => Err(GenerationError::new(kind, message)),
            Some(Scripted::RetryThenReply(retries, text)) => {
                for attempt in 1..=retries {
                    emit(GenerationEvent::RetryScheduled {
                        attempt,
                        kind: ErrorKind::ReadTimeout,
                        delay: Duration::from_secs(3),
                        message: format!("retry {attempt}"),
                    });
                }
                Ok(text)
            }
            None => panic!("scripted client called more often than scripted"),
        }
    }
}

/// The four mandatory artifacts from the reference scenario.
pub fn mandatory_artifacts() -> ArtifactStore {
    ArtifactStore::new()
        .with(ArtifactSlot::AgentsConfig, "role: x")
        .with(ArtifactSlot::TasksConfig, "desc: y")
        .with(ArtifactSlot::CrewSource, "")
        .with(ArtifactSlot::MainSource, "print(1)")
}


pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
