use conversation_log::Turn;
use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactSlot;
use crate::session::{Session, SessionState};

/// Serializable view of a session for hosts that poll state.
///
/// Artifact contents are not included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    pub uploaded: Vec<ArtifactSlot>,
    pub has_error_log: bool,
    pub turns: Vec<Turn>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &Session) -> Self {
        Self {
            state: session.state(),
            uploaded: session.artifacts().slots().collect(),
            has_error_log: session.artifacts().has_error_log(),
            turns: session.log().turns().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactStore;

    #[test]
    fn snapshot_serializes_state_tag_inline() {
        let mut session = Session::new();
        session
            .start(
                ArtifactStore::new()
                    .with(ArtifactSlot::AgentsConfig, "a")
                    .with(ArtifactSlot::TasksConfig, "b")
                    .with(ArtifactSlot::CrewSource, "c")
                    .with(ArtifactSlot::MainSource, "d")
                    .with_error_log("Traceback"),
            )
            .expect("start");

        let value = serde_json::to_value(SessionSnapshot::capture(&session)).expect("serialize");

        assert_eq!(value["state"], "no_history");
        assert_eq!(value["uploaded"][0], "agents_config");
        assert_eq!(value["has_error_log"], true);
        assert_eq!(value["turns"], serde_json::json!([]));
    }
}
