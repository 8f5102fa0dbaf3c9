//! Construction-time staleness check.
//!
//! Compares the code files currently on disk with the documents recorded in
//! an existing artifact's workspace model.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::artifact::{BuildArtifact, Workspace};
use crate::error::Result;
use crate::scan::code_files;

/// Returns true if `artifact` no longer matches the code files under `project_dir`.
///
/// The artifact is fresh when the counts are equal and every file on disk is
/// a recorded document. The disk scan is recursive.
pub fn needs_update(project_dir: &Path, artifact: &BuildArtifact) -> Result<bool> {
    let on_disk = code_files(project_dir)?;
    let workspace = Workspace::from_artifact(artifact);
    let recorded: FxHashSet<&Path> = workspace.document_paths().collect();

    let counts_equal = on_disk.len() == recorded.len();
    let contains_all = on_disk.iter().all(|path| recorded.contains(path.as_path()));

    if !(counts_equal && contains_all) {
        tracing::debug!(
            "Artifact for {} is stale: {} files on disk, {} recorded",
            project_dir.display(),
            on_disk.len(),
            recorded.len()
        );
        return Ok(true);
    }

    Ok(false)
}
