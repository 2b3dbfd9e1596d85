use std::sync::Arc;

use conversation_log::{Clock, ConversationLog, SystemClock};
use generation_client::{ChatMessage, ErrorKind, GenerationError};
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStore;
use crate::context::first_turn_content;
use crate::error::SessionRejection;

/// Lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No artifacts submitted.
    Empty,
    /// Artifacts submitted, no exchange recorded yet.
    NoHistory,
    /// One generation call is in flight.
    InProgress { initial: bool },
    /// At least one exchange recorded, nothing in flight.
    Idle,
}

impl SessionState {
    #[must_use]
    pub fn is_started(self) -> bool {
        !matches!(self, Self::Empty)
    }

    #[must_use]
    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::InProgress { .. })
    }
}

/// Result of a dispatched turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Both turns were appended.
    Completed { reply: String },
    /// Nothing was appended and the session reverted.
    Failed { kind: ErrorKind, message: String },
    /// The session was reset while the call was in flight; the result was dropped.
    Superseded,
}

/// Turn that has been admitted and must be resolved with [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    epoch: u64,
    initial: bool,
    user_content: String,
    messages: Vec<ChatMessage>,
}

impl PendingTurn {
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Full user content that will be stored on success.
    #[must_use]
    pub fn user_content(&self) -> &str {
        &self.user_content
    }

    /// History to transmit, ending with the pending user message.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// State owned by one session: artifacts, conversation and lifecycle.
///
/// Every transition is synchronous and in-memory. A generation call happens
/// between [`Session::begin_turn`] and [`Session::complete`], outside any lock
/// the host may hold around the session.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    artifacts: ArtifactStore,
    log: ConversationLog,
    clock: Arc<dyn Clock>,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::default()))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: SessionState::Empty,
            artifacts: ArtifactStore::new(),
            log: ConversationLog::with_clock(Arc::clone(&clock)),
            clock,
            epoch: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    #[must_use]
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Accepts the artifact submission; all mandatory slots must be present.
    pub fn start(&mut self, artifacts: ArtifactStore) -> Result<(), SessionRejection> {
        if self.state.is_started() {
            return Err(SessionRejection::AlreadyStarted);
        }
        let missing = artifacts.missing_mandatory();
        if !missing.is_empty() {
            return Err(SessionRejection::MissingArtifacts { missing });
        }

        self.artifacts = artifacts;
        self.state = SessionState::NoHistory;
        Ok(())
    }

    /// Admits one turn and moves to `InProgress`.
    ///
    /// Without history the turn carries the assembled context followed by
    /// `text`; afterwards it is `text` alone, appended to the full log.
    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, SessionRejection> {
        let initial = match self.state {
            SessionState::Empty => return Err(SessionRejection::NotStarted),
            SessionState::InProgress { .. } => return Err(SessionRejection::Busy),
            SessionState::NoHistory => true,
            SessionState::Idle => false,
        };

        let user_content = if initial {
            first_turn_content(&self.artifacts, text)
        } else {
            text.to_string()
        };
        let mut messages = self.log.to_messages();
        messages.push(ChatMessage::user(user_content.clone()));

        self.state = SessionState::InProgress { initial };
        Ok(PendingTurn {
            epoch: self.epoch,
            initial,
            user_content,
            messages,
        })
    }

    /// Applies the result of a pending turn.
    ///
    /// Success appends the exchange; failure appends nothing and reverts to
    /// the state the turn started from. Results from before a reset are dropped.
    pub fn complete(
        &mut self,
        pending: PendingTurn,
        result: Result<String, GenerationError>,
    ) -> TurnOutcome {
        if pending.epoch != self.epoch {
            return TurnOutcome::Superseded;
        }

        let revert_to = if pending.initial {
            SessionState::NoHistory
        } else {
            SessionState::Idle
        };

        match result {
            Ok(reply) => match self.log.append_exchange(pending.user_content, reply.clone()) {
                Ok(()) => {
                    self.state = SessionState::Idle;
                    TurnOutcome::Completed { reply }
                }
                Err(error) => {
                    self.state = revert_to;
                    TurnOutcome::Failed {
                        kind: ErrorKind::Unclassified,
                        message: error.to_string(),
                    }
                }
            },
            Err(error) => {
                self.state = revert_to;
                TurnOutcome::Failed {
                    kind: error.kind,
                    message: error.message,
                }
            }
        }
    }

    /// Discards artifacts, error log and conversation; returns to `Empty`.
    pub fn reset(&mut self) {
        self.state = SessionState::Empty;
        self.artifacts = ArtifactStore::new();
        self.log = ConversationLog::with_clock(Arc::clone(&self.clock));
        self.epoch += 1;
    }
}
