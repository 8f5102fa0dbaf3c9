//! File classification by name suffix.
//!
//! Classification drives the invalidation policy: only project files, code
//! files and build logs can make a cached build stale.

use std::path::Path;

use serde::Serialize;

/// Suffixes of project files (`.csproj`, `.fsproj`).
const PROJECT_SUFFIXES: &[&str] = &[".csproj", ".fsproj"];

/// Suffixes of code files (`.cs`, `.fs`).
const CODE_SUFFIXES: &[&str] = &[".cs", ".fs"];

/// Suffix of binary build logs.
const BUILD_LOG_SUFFIX: &str = ".binlog";

/// What kind of file a change notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClassification {
    /// `.csproj` / `.fsproj`
    ProjectFile,
    /// `.cs` / `.fs`
    CodeFile,
    /// `.binlog`
    BuildLogFile,
    /// Anything else.
    Other,
}

impl FileClassification {
    /// Classify a file name. Matching is a case-insensitive suffix test.
    pub fn of_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();

        if PROJECT_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Self::ProjectFile
        } else if CODE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            Self::CodeFile
        } else if lower.ends_with(BUILD_LOG_SUFFIX) {
            Self::BuildLogFile
        } else {
            Self::Other
        }
    }

    /// Classify the final component of a path.
    ///
    /// Paths without a file name (`/`, `..`) are [`Other`](Self::Other).
    pub fn of_path(path: &Path) -> Self {
        path.file_name()
            .map(|name| Self::of_name(&name.to_string_lossy()))
            .unwrap_or(Self::Other)
    }

    /// Project and code files: the ones whose creation invalidates.
    pub fn is_source(self) -> bool {
        matches!(self, Self::ProjectFile | Self::CodeFile)
    }
}

/// Returns true if the path names a code file.
pub fn is_code_file(path: &Path) -> bool {
    FileClassification::of_path(path) == FileClassification::CodeFile
}

/// Returns true if the path names a project file.
pub fn is_project_file(path: &Path) -> bool {
    FileClassification::of_path(path) == FileClassification::ProjectFile
}
