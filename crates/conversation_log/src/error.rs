use generation_client::Role;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationLogError {
    #[error("turn {index} must be authored by {expected}, got {found}")]
    OutOfOrder {
        index: usize,
        expected: Role,
        found: Role,
    },
}
