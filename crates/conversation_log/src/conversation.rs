use std::sync::Arc;

use generation_client::{ChatMessage, Role};

use crate::clock::{Clock, SystemClock};
use crate::error::ConversationLogError;
use crate::schema::Turn;
use crate::transcript::render_transcript;

/// Append-only, strictly alternating record of one conversation.
///
/// Turns are never edited or removed; the only way to shrink the log is to
/// drop it.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    clock: Arc<dyn Clock>,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock::default()))
    }

    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            turns: Vec::new(),
            clock,
        }
    }

    /// Stamps the current time and stores one turn.
    ///
    /// The first turn must be a user turn and roles must alternate after it.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<&Turn, ConversationLogError> {
        self.check_next_role(role)?;
        let turn = Turn::new(role, content, self.clock.now());
        self.turns.push(turn);
        Ok(&self.turns[self.turns.len() - 1])
    }

    /// Stores a user turn and its assistant reply together, or neither.
    pub fn append_exchange(
        &mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<(), ConversationLogError> {
        self.check_next_role(Role::User)?;
        let user = Turn::new(Role::User, user, self.clock.now());
        let assistant = Turn::new(Role::Assistant, assistant, self.clock.now());
        self.turns.push(user);
        self.turns.push(assistant);
        Ok(())
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Ordered history without timestamps, ready for a generation request.
    #[must_use]
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }

    /// Human-readable transcript of every turn in append order.
    #[must_use]
    pub fn export(&self) -> String {
        render_transcript(&self.turns)
    }

    fn check_next_role(&self, found: Role) -> Result<(), ConversationLogError> {
        let expected = self
            .turns
            .last()
            .map_or(Role::User, |turn| turn.role.next());
        if found != expected {
            return Err(ConversationLogError::OutOfOrder {
                index: self.turns.len(),
                expected,
                found,
            });
        }

        Ok(())
    }
}
