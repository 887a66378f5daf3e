use std::fs;
use std::path::{Path, PathBuf};

use crate::io::store::{JsonStore, StoreError};
use crate::model::config::WorkspaceConfig;

/// Error type for workspace operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("no chores workspace found (run `ch init` to create one)")]
    NotFound,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered workspace: its root, the chores/ data directory, and
/// the parsed config.
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub chores_dir: PathBuf,
    pub config: WorkspaceConfig,
}

impl Workspace {
    pub fn tasks_path(&self) -> PathBuf {
        self.chores_dir.join("tasks.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.chores_dir.join("config.toml")
    }

    /// Open the JSON task store for this workspace.
    pub fn open_store(&self) -> Result<JsonStore, StoreError> {
        JsonStore::open(&self.tasks_path())
    }
}

/// Find the workspace root by walking up from the given directory,
/// looking for a `chores/` directory that holds a config.toml.
pub fn discover(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if is_workspace_root(&current) {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotFound);
        }
    }
}

/// Check if a directory is a workspace root (has chores/config.toml)
pub fn is_workspace_root(dir: &Path) -> bool {
    let chores_dir = dir.join("chores");
    chores_dir.is_dir() && chores_dir.join("config.toml").is_file()
}

/// Load the workspace rooted at `root`.
pub fn load(root: &Path) -> Result<Workspace, WorkspaceError> {
    let chores_dir = root.join("chores");
    let config_path = chores_dir.join("config.toml");
    let text = fs::read_to_string(&config_path).map_err(|e| WorkspaceError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: WorkspaceConfig = toml::from_str(&text)?;
    Ok(Workspace {
        root: root.to_path_buf(),
        chores_dir,
        config,
    })
}
