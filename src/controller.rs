use std::sync::{Arc, Mutex};

use conversation_log::{Clock, SystemClock, Turn};
use generation_client::{
    ClientProfile, ErrorKind, GenerationClient, GenerationEvent, GenerationRequest,
};

use crate::artifacts::ArtifactStore;
use crate::context::INITIAL_INSTRUCTION;
use crate::error::SessionRejection;
use crate::lock_unpoisoned;
use crate::session::{PendingTurn, Session, SessionState, TurnOutcome};
use crate::snapshot::SessionSnapshot;

/// Progress reported while a controller operation runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Attempt `attempt` failed and will be retried.
    RetryWarning { attempt: u32, message: String },
    /// The turn failed for good; emitted once.
    Failed { kind: ErrorKind, message: String },
}

/// Drives one session against a generation client.
///
/// At most one call is in flight per controller. The session lock is released
/// while the call runs, so state queries and reset stay responsive; a reset
/// during the call makes its result [`TurnOutcome::Superseded`].
pub struct SessionController {
    session: Mutex<Session>,
    client: Arc<dyn GenerationClient>,
    system_instruction: String,
}

impl SessionController {
    pub fn new(client: Arc<dyn GenerationClient>, system_instruction: impl Into<String>) -> Self {
        Self::with_clock(client, system_instruction, Arc::new(SystemClock::default()))
    }

    pub fn with_clock(
        client: Arc<dyn GenerationClient>,
        system_instruction: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session: Mutex::new(Session::with_clock(clock)),
            client,
            system_instruction: system_instruction.into(),
        }
    }

    pub fn profile(&self) -> ClientProfile {
        self.client.profile()
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Starts the session and immediately runs the initial analysis.
    pub fn submit_artifacts(
        &self,
        artifacts: ArtifactStore,
        emit: &mut dyn FnMut(SessionEvent),
    ) -> Result<TurnOutcome, SessionRejection> {
        let pending = {
            let mut session = lock_unpoisoned(&self.session);
            session.start(artifacts)?;
            tracing::info!(
                uploaded = session.artifacts().slots().count(),
                error_log = session.artifacts().has_error_log(),
                "session started"
            );
            session.begin_turn(INITIAL_INSTRUCTION)?
        };

        Ok(self.dispatch(pending, emit))
    }

    /// Re-runs the initial analysis after it failed.
    pub fn retry_initial(
        &self,
        emit: &mut dyn FnMut(SessionEvent),
    ) -> Result<TurnOutcome, SessionRejection> {
        let pending = {
            let mut session = lock_unpoisoned(&self.session);
            if session.state() == SessionState::Idle {
                return Err(SessionRejection::NoInitialTurnPending);
            }
            session.begin_turn(INITIAL_INSTRUCTION)?
        };

        Ok(self.dispatch(pending, emit))
    }

    /// Sends user text; the first exchange also carries the assembled context.
    pub fn send_message(
        &self,
        text: &str,
        emit: &mut dyn FnMut(SessionEvent),
    ) -> Result<TurnOutcome, SessionRejection> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionRejection::BlankMessage);
        }

        let pending = lock_unpoisoned(&self.session).begin_turn(text)?;
        Ok(self.dispatch(pending, emit))
    }

    /// Discards all session state. Valid in every state.
    pub fn reset(&self) {
        let mut session = lock_unpoisoned(&self.session);
        let previous = session.state();
        session.reset();
        tracing::info!(?previous, "session reset");
    }

    pub fn state(&self) -> SessionState {
        lock_unpoisoned(&self.session).state()
    }

    pub fn turns(&self) -> Vec<Turn> {
        lock_unpoisoned(&self.session).log().turns().to_vec()
    }

    /// Transcript of every recorded turn.
    pub fn export(&self) -> String {
        lock_unpoisoned(&self.session).log().export()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&lock_unpoisoned(&self.session))
    }

    fn dispatch(&self, pending: PendingTurn, emit: &mut dyn FnMut(SessionEvent)) -> TurnOutcome {
        tracing::info!(
            initial = pending.is_initial(),
            history = pending.messages().len(),
            "turn submitted"
        );

        let request = GenerationRequest {
            messages: pending.messages().to_vec(),
            system_instruction: self.system_instruction.clone(),
        };
        let result = self.client.send(request, &mut |event| match event {
            GenerationEvent::RetryScheduled {
                attempt, message, ..
            } => emit(SessionEvent::RetryWarning { attempt, message }),
        });

        let outcome = lock_unpoisoned(&self.session).complete(pending, result);
        match &outcome {
            TurnOutcome::Completed { .. } => tracing::info!("turn completed"),
            TurnOutcome::Failed { kind, message } => {
                tracing::warn!(kind = %kind, "turn failed");
                emit(SessionEvent::Failed {
                    kind: *kind,
                    message: message.clone(),
                });
            }
            TurnOutcome::Superseded => {
                tracing::info!("turn result discarded after reset");
            }
        }
        outcome
    }
}
