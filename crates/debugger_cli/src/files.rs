use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use crew_debugger::{ArtifactSlot, ArtifactStore};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to read {label} from {path}: {source}")]
pub struct ReadArtifactError {
    pub label: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Locations of the files that make up one session.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ArtifactPaths {
    /// Agent definitions (agents.yaml).
    #[arg(long, value_name = "PATH")]
    pub agents: PathBuf,
    /// Task definitions (tasks.yaml).
    #[arg(long, value_name = "PATH")]
    pub tasks: PathBuf,
    /// Crew orchestration source (crew.py).
    #[arg(long, value_name = "PATH")]
    pub crew: PathBuf,
    /// Entry point source (main.py).
    #[arg(long = "main", value_name = "PATH")]
    pub main_source: PathBuf,
    /// Custom tool source (tools.py).
    #[arg(long, value_name = "PATH")]
    pub tools: Option<PathBuf>,
    /// Error output captured from a failing run.
    #[arg(long, value_name = "PATH")]
    pub error_log: Option<PathBuf>,
}

impl ArtifactPaths {
    fn slot_paths(&self) -> impl Iterator<Item = (ArtifactSlot, &Path)> {
        [
            (ArtifactSlot::AgentsConfig, Some(self.agents.as_path())),
            (ArtifactSlot::TasksConfig, Some(self.tasks.as_path())),
            (ArtifactSlot::ToolsSource, self.tools.as_deref()),
            (ArtifactSlot::CrewSource, Some(self.crew.as_path())),
            (ArtifactSlot::MainSource, Some(self.main_source.as_path())),
        ]
        .into_iter()
        .filter_map(|(slot, path)| path.map(|path| (slot, path)))
    }

    /// Reads every named file as UTF-8.
    pub fn load(&self) -> Result<ArtifactStore, ReadArtifactError> {
        let mut store = ArtifactStore::new();
        for (slot, path) in self.slot_paths() {
            store.insert(slot, read_utf8(slot.file_name(), path)?);
        }
        if let Some(path) = &self.error_log {
            store.set_error_log(read_utf8("error log", path)?);
        }
        Ok(store)
    }
}

fn read_utf8(label: &'static str, path: &Path) -> Result<String, ReadArtifactError> {
    fs::read_to_string(path).map_err(|source| ReadArtifactError {
        label,
        path: path.to_path_buf(),
        source,
    })
}
