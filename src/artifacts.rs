use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of uploadable files, declared in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSlot {
    AgentsConfig,
    TasksConfig,
    ToolsSource,
    CrewSource,
    MainSource,
}

impl ArtifactSlot {
    pub const ALL: [Self; 5] = [
        Self::AgentsConfig,
        Self::TasksConfig,
        Self::ToolsSource,
        Self::CrewSource,
        Self::MainSource,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AgentsConfig => "agents_config",
            Self::TasksConfig => "tasks_config",
            Self::ToolsSource => "tools_source",
            Self::CrewSource => "crew_source",
            Self::MainSource => "main_source",
        }
    }

    /// Conventional file name for the slot.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::AgentsConfig => "agents.yaml",
            Self::TasksConfig => "tasks.yaml",
            Self::ToolsSource => "tools.py",
            Self::CrewSource => "crew.py",
            Self::MainSource => "main.py",
        }
    }

    /// Section heading used in the assembled context.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::AgentsConfig => "AGENTS.YAML",
            Self::TasksConfig => "TASKS.YAML",
            Self::ToolsSource => "TOOLS.PY",
            Self::CrewSource => "CREW.PY",
            Self::MainSource => "MAIN.PY",
        }
    }

    /// Language tag for the fenced block.
    #[must_use]
    pub fn fence_language(self) -> &'static str {
        match self {
            Self::AgentsConfig | Self::TasksConfig => "yaml",
            Self::ToolsSource | Self::CrewSource | Self::MainSource => "python",
        }
    }

    #[must_use]
    pub fn is_mandatory(self) -> bool {
        !matches!(self, Self::ToolsSource)
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Uploaded artifacts and optional error log for one session.
///
/// A slot is present once supplied, even with empty content. The store is
/// filled before submission; a started session only hands out shared
/// references, so stored content cannot change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactStore {
    artifacts: BTreeMap<ArtifactSlot, String>,
    error_log: Option<String>,
}

impl ArtifactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ArtifactStore::insert`].
    #[must_use]
    pub fn with(mut self, slot: ArtifactSlot, content: impl Into<String>) -> Self {
        self.insert(slot, content);
        self
    }

    #[must_use]
    pub fn with_error_log(mut self, error_log: impl Into<String>) -> Self {
        self.set_error_log(error_log);
        self
    }

    /// Stores `content` in `slot`, replacing an earlier upload.
    pub fn insert(&mut self, slot: ArtifactSlot, content: impl Into<String>) {
        self.artifacts.insert(slot, content.into());
    }

    pub fn set_error_log(&mut self, error_log: impl Into<String>) {
        self.error_log = Some(error_log.into());
    }

    #[must_use]
    pub fn get(&self, slot: ArtifactSlot) -> Option<&str> {
        self.artifacts.get(&slot).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, slot: ArtifactSlot) -> bool {
        self.artifacts.contains_key(&slot)
    }

    /// Error log as supplied, including whitespace-only text.
    #[must_use]
    pub fn error_log(&self) -> Option<&str> {
        self.error_log.as_deref()
    }

    /// True when the error log has at least one non-whitespace character.
    #[must_use]
    pub fn has_error_log(&self) -> bool {
        self.error_log
            .as_deref()
            .is_some_and(|log| !log.trim().is_empty())
    }

    /// Present slots in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactSlot, &str)> {
        self.artifacts
            .iter()
            .map(|(slot, content)| (*slot, content.as_str()))
    }

    pub fn slots(&self) -> impl Iterator<Item = ArtifactSlot> + '_ {
        self.artifacts.keys().copied()
    }

    #[must_use]
    pub fn missing_mandatory(&self) -> Vec<ArtifactSlot> {
        ArtifactSlot::ALL
            .into_iter()
            .filter(|slot| slot.is_mandatory() && !self.contains(*slot))
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_mandatory().is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.error_log.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tools_source_is_optional() {
        let optional: Vec<_> = ArtifactSlot::ALL
            .into_iter()
            .filter(|slot| !slot.is_mandatory())
            .collect();
        assert_eq!(optional, vec![ArtifactSlot::ToolsSource]);
    }

    #[test]
    fn missing_mandatory_lists_slots_in_declared_order() {
        let store = ArtifactStore::new().with(ArtifactSlot::TasksConfig, "tasks: []");

        assert_eq!(
            store.missing_mandatory(),
            vec![
                ArtifactSlot::AgentsConfig,
                ArtifactSlot::CrewSource,
                ArtifactSlot::MainSource,
            ]
        );
        assert!(!store.is_complete());
    }

    #[test]
    fn empty_content_counts_as_present() {
        let store = ArtifactStore::new()
            .with(ArtifactSlot::AgentsConfig, "")
            .with(ArtifactSlot::TasksConfig, "")
            .with(ArtifactSlot::CrewSource, "")
            .with(ArtifactSlot::MainSource, "");

        assert!(store.is_complete());
        assert_eq!(store.get(ArtifactSlot::CrewSource), Some(""));
        assert_eq!(store.get(ArtifactSlot::ToolsSource), None);
    }

    #[test]
    fn whitespace_error_log_is_stored_but_not_meaningful() {
        let store = ArtifactStore::new().with_error_log(" \n\t");
        assert_eq!(store.error_log(), Some(" \n\t"));
        assert!(!store.has_error_log());
        assert!(!store.is_empty());
    }

    #[test]
    fn iter_follows_slot_order_regardless_of_insertion_order() {
        let store = ArtifactStore::new()
            .with(ArtifactSlot::MainSource, "m")
            .with(ArtifactSlot::AgentsConfig, "a")
            .with(ArtifactSlot::ToolsSource, "t");

        let slots: Vec<_> = store.slots().collect();
        assert_eq!(
            slots,
            vec![
                ArtifactSlot::AgentsConfig,
                ArtifactSlot::ToolsSource,
                ArtifactSlot::MainSource,
            ]
        );
    }
}
