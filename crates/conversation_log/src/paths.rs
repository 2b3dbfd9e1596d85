use time::OffsetDateTime;

pub const EXPORT_FILE_PREFIX: &str = "crewai_conversation";

/// Default download name for an exported transcript.
#[must_use]
pub fn export_file_name(now: OffsetDateTime) -> String {
    format!(
        "{EXPORT_FILE_PREFIX}_{:04}{:02}{:02}_{:02}{:02}{:02}.md",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
