//! Configuration for the build cache.

use std::path::PathBuf;
use std::time::Duration;

use crate::paths::ProjectDirs;

/// Default number of rebuilds attempted when file changes keep landing
/// during a build.
pub const DEFAULT_MAX_STALE_REBUILDS: u32 = 3;

/// Configuration for a [`BuildCache`](crate::BuildCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Upper bound on how long a caller waits for one build.
    /// `None` waits indefinitely.
    pub build_timeout: Option<Duration>,

    /// How many times a build whose result was invalidated mid-flight is
    /// retried before giving up with [`Error::Superseded`](crate::Error::Superseded).
    pub max_stale_rebuilds: u32,

    /// Where to persist the artifact snapshot. `None` disables persistence.
    pub artifact_path: Option<PathBuf>,

    /// Arm the filesystem watcher after the first successful build.
    pub watch: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            build_timeout: None,
            max_stale_rebuilds: DEFAULT_MAX_STALE_REBUILDS,
            artifact_path: None,
            watch: true,
        }
    }
}

impl CacheConfig {
    /// In-memory only: no persistence, watching enabled.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    /// Create a config with paths from [`ProjectDirs`].
    ///
    /// This is the recommended way to create a config for interactive use.
    pub fn for_project(dirs: &ProjectDirs) -> Self {
        Self {
            artifact_path: Some(dirs.artifact_path()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = Some(timeout);
        self
    }

    pub fn without_watch(mut self) -> Self {
        self.watch = false;
        self
    }
}
