//! Build artifacts and the workspace model derived from them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::Result;
use crate::scan::scan_project;

/// Output of one successful build of a project directory.
///
/// The document list is the set of code files the build saw. It is what the
/// staleness check compares the disk against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    /// Directory that was built.
    pub project_dir: PathBuf,

    /// Project files (`.csproj` / `.fsproj`) found at build time.
    pub project_files: Vec<PathBuf>,

    /// Code files compiled by the build.
    pub documents: Vec<PathBuf>,

    /// Binary build log, if the tool produced one.
    pub build_log: Option<PathBuf>,

    /// Captured standard output of the build tool.
    pub output: String,

    /// Wall time of the build.
    pub duration: Duration,

    /// Unix timestamp when the artifact was created.
    pub created_at: u64,
}

impl BuildArtifact {
    /// Create an empty artifact for `project_dir`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            project_files: Vec::new(),
            documents: Vec::new(),
            build_log: None,
            output: String::new(),
            duration: Duration::ZERO,
            created_at: unix_now(),
        }
    }

    /// Record the current on-disk file set of `project_dir`.
    pub fn scan(project_dir: &Path) -> Result<Self> {
        let scan = scan_project(project_dir)?;
        Ok(Self {
            project_files: scan.project_files,
            documents: scan.code_files,
            ..Self::new(project_dir)
        })
    }

    /// Set the recorded documents.
    pub fn with_documents<I, P>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.documents = documents.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether a document was part of this build.
    pub fn contains_document(&self, path: &Path) -> bool {
        self.documents.iter().any(|d| d == path)
    }
}

/// Language of a workspace document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    CSharp,
    FSharp,
}

impl Language {
    /// Detect from file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "cs" | "csproj" => Some(Self::CSharp),
            "fs" | "fsproj" => Some(Self::FSharp),
            _ => None,
        }
    }
}

/// A document in the workspace model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub language: Language,
}

/// Project/document model derived from a [`BuildArtifact`].
///
/// Always invalidated together with the artifact it came from.
#[derive(Debug, Clone)]
pub struct Workspace {
    project_dir: PathBuf,
    project_name: String,
    project_files: Vec<PathBuf>,
    documents: BTreeMap<PathBuf, Document>,
}

impl Workspace {
    /// Derive the workspace model from an artifact.
    pub fn from_artifact(artifact: &BuildArtifact) -> Self {
        let project_name = artifact
            .project_files
            .first()
            .and_then(|p| p.file_stem())
            .or_else(|| artifact.project_dir.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let documents = artifact
            .documents
            .iter()
            .filter_map(|path| {
                let language = Language::from_path(path)?;
                Some((
                    path.clone(),
                    Document {
                        path: path.clone(),
                        language,
                    },
                ))
            })
            .collect();

        Self {
            project_dir: artifact.project_dir.clone(),
            project_name,
            project_files: artifact.project_files.clone(),
            documents,
        }
    }

    /// Directory this workspace models.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Project name (first project file stem, else the directory name).
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn project_files(&self) -> &[PathBuf] {
        &self.project_files
    }

    /// Paths of all documents, sorted.
    pub fn document_paths(&self) -> impl Iterator<Item = &Path> {
        self.documents.keys().map(PathBuf::as_path)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn document(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Language of the primary project file, falling back to the documents.
    pub fn language(&self) -> Option<Language> {
        self.project_files
            .first()
            .and_then(|p| Language::from_path(p))
            .or_else(|| self.documents.values().next().map(|d| d.language))
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
