//! Session core for diagnosing CrewAI projects with a text-generation model.
//!
//! A session holds a fixed set of uploaded artifacts (two YAML configs, up to
//! three Python sources and an optional error log), renders them into one
//! context block for the first user turn, and keeps a strictly alternating
//! conversation log of successful exchanges.
//!
//! ## Lifecycle
//!
//! `Empty` → `NoHistory` (artifacts accepted) → `InProgress` → `Idle`, looping
//! between `InProgress` and `Idle` for every follow-up. A failed first call
//! reverts to `NoHistory` so the analysis can be retried; a failed follow-up
//! reverts to `Idle` and records nothing. Reset is total and valid anywhere.
//!
//! ## Generation
//!
//! Calls go through the provider-neutral [`generation_client::GenerationClient`]
//! contract. Retries and error classification live in the client; the
//! controller only forwards retry warnings and the terminal failure as
//! [`SessionEvent`]s.
//!
//! ## System instructions
//!
//! Every call carries the built-in persona and checklist prompt. Set
//! `CREW_DEBUGGER_SYSTEM_INSTRUCTIONS` to override it; blank values fall back
//! to the default.

use std::sync::{Mutex, MutexGuard};

pub mod artifacts;
pub mod context;
pub mod controller;
pub mod error;
pub mod instructions;
pub mod registry;
pub mod session;
pub mod snapshot;

pub use artifacts::{ArtifactSlot, ArtifactStore};
pub use context::{assemble, first_turn_content, INITIAL_INSTRUCTION};
pub use controller::{SessionController, SessionEvent};
pub use error::SessionRejection;
pub use instructions::{system_instructions_from_env, DEFAULT_SYSTEM_INSTRUCTIONS};
pub use registry::{SessionId, SessionRegistry};
pub use session::{PendingTurn, Session, SessionState, TurnOutcome};
pub use snapshot::SessionSnapshot;

pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
