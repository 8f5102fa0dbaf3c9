//! Project directory management.
//!
//! Provides a consistent layout for Kestrel state inside a project,
//! so the CLI and the kernel package agree on where things live.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name of the state directory created inside a project.
pub const STATE_DIR_NAME: &str = ".kestrel";

/// Directory structure for a watched project.
///
/// All Kestrel files are stored under a `.kestrel` directory at the
/// project root:
///
/// ```text
/// App.csproj
/// Program.cs
/// .kestrel/
/// ├── cache/      # Persisted build artifact snapshot
/// └── logs/       # Binary build logs
/// ```
///
/// The state directory sits one level below the root, so the non-recursive
/// project watcher does not see writes into it.
#[derive(Debug, Clone)]
pub struct ProjectDirs {
    /// The project directory itself (canonical).
    pub project_dir: PathBuf,

    /// The `.kestrel` directory.
    pub state_dir: PathBuf,

    /// Directory for the artifact snapshot.
    pub cache_dir: PathBuf,

    /// Directory for build logs.
    pub logs_dir: PathBuf,
}

impl ProjectDirs {
    /// Resolve the layout for a project directory without creating anything.
    ///
    /// # Errors
    /// Returns [`Error::NotADirectory`] if `project_dir` does not exist or is
    /// not a directory.
    pub fn locate(project_dir: &Path) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .map_err(|_| Error::NotADirectory(project_dir.to_path_buf()))?;
        if !project_dir.is_dir() {
            return Err(Error::NotADirectory(project_dir));
        }

        let state_dir = project_dir.join(STATE_DIR_NAME);
        let cache_dir = state_dir.join("cache");
        let logs_dir = state_dir.join("logs");

        Ok(Self {
            project_dir,
            state_dir,
            cache_dir,
            logs_dir,
        })
    }

    /// Resolve the layout and create the state directories.
    pub fn create(project_dir: &Path) -> Result<Self> {
        let dirs = Self::locate(project_dir)?;
        fs::create_dir_all(&dirs.cache_dir)?;
        fs::create_dir_all(&dirs.logs_dir)?;
        Ok(dirs)
    }

    /// Path of the persisted artifact snapshot.
    pub fn artifact_path(&self) -> PathBuf {
        self.cache_dir.join("artifact.bin")
    }

    /// Path of the binary build log.
    pub fn build_log_path(&self) -> PathBuf {
        self.logs_dir.join("msbuild.binlog")
    }

    /// Remove the whole state directory.
    pub fn clean(&self) -> Result<()> {
        if self.state_dir.exists() {
            fs::remove_dir_all(&self.state_dir)?;
        }
        Ok(())
    }
}
