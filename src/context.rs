use std::fmt::Write as _;

use crate::artifacts::ArtifactStore;

/// First line of every assembled context block.
pub const CONTEXT_PREAMBLE: &str = "Here are the uploaded CrewAI system files:\n\n";
/// Text that follows the context when the session triggers the first turn itself.
pub const INITIAL_INSTRUCTION: &str = "Please analyze my system and identify any issues.";
pub const ERROR_LOG_HEADING: &str = "ERROR LOG";

/// Renders present artifacts, then the error log when it is non-blank.
///
/// Pure function of its input; absent slots leave no trace in the output.
#[must_use]
pub fn assemble(store: &ArtifactStore) -> String {
    let mut context = String::from(CONTEXT_PREAMBLE);
    for (slot, content) in store.iter() {
        push_section(&mut context, slot.heading(), slot.fence_language(), content);
    }
    if store.has_error_log() {
        if let Some(log) = store.error_log() {
            push_section(&mut context, ERROR_LOG_HEADING, "", log);
        }
    }
    context
}

/// Content of the context-bearing first user turn.
#[must_use]
pub fn first_turn_content(store: &ArtifactStore, text: &str) -> String {
    let mut content = assemble(store);
    content.push('\n');
    content.push_str(text);
    content
}

fn push_section(out: &mut String, heading: &str, language: &str, content: &str) {
    // Writing into a String cannot fail.
    let _ = write!(out, "## {heading}\n```{language}\n{content}\n```\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::ArtifactSlot;

    #[test]
    fn empty_store_renders_preamble_only() {
        assert_eq!(assemble(&ArtifactStore::new()), CONTEXT_PREAMBLE);
    }

    #[test]
    fn optional_tools_source_sits_between_configs_and_crew() {
        let store = ArtifactStore::new()
            .with(ArtifactSlot::CrewSource, "crew = Crew()")
            .with(ArtifactSlot::ToolsSource, "@tool")
            .with(ArtifactSlot::TasksConfig, "t: 1");

        assert_eq!(
            assemble(&store),
            "Here are the uploaded CrewAI system files:\n\n\
             ## TASKS.YAML\n```yaml\nt: 1\n```\n\n\
             ## TOOLS.PY\n```python\n@tool\n```\n\n\
             ## CREW.PY\n```python\ncrew = Crew()\n```\n\n"
        );
    }

    #[test]
    fn first_turn_appends_text_after_blank_line() {
        let store = ArtifactStore::new().with(ArtifactSlot::MainSource, "print(1)");
        let content = first_turn_content(&store, INITIAL_INSTRUCTION);

        assert!(content.ends_with("```\n\n\nPlease analyze my system and identify any issues."));
    }
}
