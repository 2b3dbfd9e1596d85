use thiserror::Error;

use crate::artifacts::ArtifactSlot;

/// Reasons a controller operation was refused before any generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionRejection {
    #[error("session has not started; submit the artifacts first")]
    NotStarted,

    #[error("session already started; reset it to submit new artifacts")]
    AlreadyStarted,

    #[error("missing required artifacts: {}", join_slots(.missing))]
    MissingArtifacts { missing: Vec<ArtifactSlot> },

    #[error("message is blank")]
    BlankMessage,

    #[error("a generation call is already in flight")]
    Busy,

    #[error("the initial analysis has already completed")]
    NoInitialTurnPending,
}

fn join_slots(slots: &[ArtifactSlot]) -> String {
    slots
        .iter()
        .map(|slot| slot.file_name())
        .collect::<Vec<_>>()
        .join(", ")
}
