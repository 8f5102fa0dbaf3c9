//! Recursive discovery of project and code files on disk.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::classify::{is_code_file, is_project_file};
use crate::error::{Error, Result};

/// Files of interest found under a project directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectScan {
    /// `.csproj` / `.fsproj` files, sorted.
    pub project_files: Vec<PathBuf>,
    /// `.cs` / `.fs` files, sorted.
    pub code_files: Vec<PathBuf>,
}

/// Walk `dir` recursively and collect project and code files.
///
/// Unreadable entries below the root are skipped with a warning; an
/// unreadable root is an error.
pub fn scan_project(dir: &Path) -> Result<ProjectScan> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut scan = ProjectScan::default();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e
                    .into_io_error()
                    .map(Error::Io)
                    .unwrap_or_else(|| Error::NotADirectory(dir.to_path_buf())));
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable entry during scan: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        if is_code_file(&path) {
            scan.code_files.push(path);
        } else if is_project_file(&path) {
            scan.project_files.push(path);
        }
    }

    scan.project_files.sort();
    scan.code_files.sort();

    tracing::trace!(
        "Scanned {}: {} project files, {} code files",
        dir.display(),
        scan.project_files.len(),
        scan.code_files.len()
    );

    Ok(scan)
}

/// Recursive list of code files under `dir`.
pub fn code_files(dir: &Path) -> Result<Vec<PathBuf>> {
    scan_project(dir).map(|scan| scan.code_files)
}
