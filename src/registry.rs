use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use conversation_log::{Clock, SystemClock};
use generation_client::GenerationClient;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::SessionController;
use crate::lock_unpoisoned;

/// Host-supplied key for one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Random v4 identifier for hosts without their own keys.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Independent sessions sharing one generation client.
pub struct SessionRegistry {
    client: Arc<dyn GenerationClient>,
    system_instruction: String,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<SessionId, Arc<SessionController>>>,
}

impl SessionRegistry {
    pub fn new(client: Arc<dyn GenerationClient>, system_instruction: impl Into<String>) -> Self {
        Self::with_clock(client, system_instruction, Arc::new(SystemClock::default()))
    }

    pub fn with_clock(
        client: Arc<dyn GenerationClient>,
        system_instruction: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            system_instruction: system_instruction.into(),
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the session for `id`, creating an empty one if needed.
    pub fn open(&self, id: &SessionId) -> Arc<SessionController> {
        let mut sessions = lock_unpoisoned(&self.sessions);
        let controller = sessions.entry(id.clone()).or_insert_with(|| {
            tracing::debug!(session = %id, "session opened");
            Arc::new(SessionController::with_clock(
                Arc::clone(&self.client),
                self.system_instruction.clone(),
                Arc::clone(&self.clock),
            ))
        });
        Arc::clone(controller)
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<SessionController>> {
        lock_unpoisoned(&self.sessions).get(id).cloned()
    }

    /// Drops the session; returns false if it was not open.
    pub fn close(&self, id: &SessionId) -> bool {
        lock_unpoisoned(&self.sessions).remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        lock_unpoisoned(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
