//! Check command implementation for Kestrel CLI.

use std::path::Path;

use kestrel_core::{ArtifactStore, ProjectDirs, needs_update};

use crate::colors;

/// Compare the recorded build with the files on disk.
///
/// Returns `true` when the recorded build is still current.
pub fn execute(dir: &Path) -> anyhow::Result<bool> {
    let dirs = ProjectDirs::locate(dir)?;
    let store = ArtifactStore::new(dirs.artifact_path());

    let Some(artifact) = store.load()? else {
        println!(
            "{}No recorded build{} for {}",
            colors::YELLOW,
            colors::RESET,
            dirs.project_dir.display()
        );
        return Ok(false);
    };

    if needs_update(&dirs.project_dir, &artifact)? {
        println!(
            "{}Stale{}: code files changed since the last build",
            colors::YELLOW,
            colors::RESET
        );
        Ok(false)
    } else {
        println!(
            "{}Up to date{} ({} documents)",
            colors::GREEN,
            colors::RESET,
            artifact.documents.len()
        );
        Ok(true)
    }
}
