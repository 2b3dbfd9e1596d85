pub const SYSTEM_INSTRUCTIONS_ENV_VAR: &str = "CREW_DEBUGGER_SYSTEM_INSTRUCTIONS";
/// Persona and analysis checklist sent with every generation call.
pub const DEFAULT_SYSTEM_INSTRUCTIONS: &str = include_str!("system_instructions.md");

pub fn system_instructions_from_env() -> String {
    let from_env = std::env::var(SYSTEM_INSTRUCTIONS_ENV_VAR).ok();
    sanitize_system_instructions(from_env)
}

pub fn sanitize_system_instructions(raw: Option<String>) -> String {
    let Some(value) = raw else {
        return DEFAULT_SYSTEM_INSTRUCTIONS.to_string();
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_SYSTEM_INSTRUCTIONS.to_string()
    } else {
        trimmed.to_string()
    }
}
