mod clock;
mod conversation;
mod error;
mod paths;
mod schema;
mod transcript;

pub use clock::{Clock, SystemClock};
pub use conversation::ConversationLog;
pub use error::ConversationLogError;
pub use paths::export_file_name;
pub use schema::Turn;
pub use transcript::{format_timestamp, render_transcript};
