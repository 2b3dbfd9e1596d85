use time::OffsetDateTime;

use crate::schema::Turn;

/// Renders `**ROLE** (YYYY-MM-DD HH:MM:SS):` blocks separated by `---`.
#[must_use]
pub fn render_transcript(turns: &[Turn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str("**");
        out.push_str(&turn.role.as_str().to_ascii_uppercase());
        out.push_str("** (");
        out.push_str(&format_timestamp(turn.timestamp));
        out.push_str("):\n");
        out.push_str(&turn.content);
        out.push_str("\n\n---\n\n");
    }
    out
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset.
#[must_use]
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        timestamp.year(),
        u8::from(timestamp.month()),
        timestamp.day(),
        timestamp.hour(),
        timestamp.minute(),
        timestamp.second()
    )
}
