//! Artifact persistence using rkyv.
//!
//! A successful build is snapshotted to disk so a new session can pick it up
//! and, if the code file set still matches, skip the first rebuild.
//!
//! Only the file sets and build metadata are stored. The snapshot is written
//! after successful builds and read once at cache construction.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use rkyv::{Archive, Deserialize, Serialize, rancor, util::AlignedVec};

use crate::artifact::BuildArtifact;
use crate::error::{Error, Result};

/// Current snapshot format version.
///
/// Increment this when the format changes in an incompatible way.
/// Snapshots with a different version are treated as missing.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of a [`BuildArtifact`].
#[derive(Archive, Serialize, Deserialize, Debug, Clone)]
pub struct ArtifactSnapshot {
    /// Format version for compatibility checking.
    pub version: u32,
    pub project_dir: String,
    pub project_files: Vec<String>,
    pub documents: Vec<String>,
    pub build_log: Option<String>,
    pub output: String,
    pub duration_ms: u64,
    pub created_at: u64,
}

impl From<&BuildArtifact> for ArtifactSnapshot {
    fn from(artifact: &BuildArtifact) -> Self {
        let lossy = |p: &PathBuf| p.to_string_lossy().into_owned();
        Self {
            version: SNAPSHOT_VERSION,
            project_dir: artifact.project_dir.to_string_lossy().into_owned(),
            project_files: artifact.project_files.iter().map(lossy).collect(),
            documents: artifact.documents.iter().map(lossy).collect(),
            build_log: artifact.build_log.as_ref().map(lossy),
            output: artifact.output.clone(),
            duration_ms: artifact.duration.as_millis() as u64,
            created_at: artifact.created_at,
        }
    }
}

impl From<ArtifactSnapshot> for BuildArtifact {
    fn from(snapshot: ArtifactSnapshot) -> Self {
        Self {
            project_dir: PathBuf::from(snapshot.project_dir),
            project_files: snapshot.project_files.into_iter().map(PathBuf::from).collect(),
            documents: snapshot.documents.into_iter().map(PathBuf::from).collect(),
            build_log: snapshot.build_log.map(PathBuf::from),
            output: snapshot.output,
            duration: Duration::from_millis(snapshot.duration_ms),
            created_at: snapshot.created_at,
        }
    }
}

/// Snapshot file for one project.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Save an artifact snapshot.
    ///
    /// Creates parent directories if they don't exist.
    /// Writes to a temp file and renames it into place.
    pub fn save(&self, artifact: &BuildArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = ArtifactSnapshot::from(artifact);
        let bytes = rkyv::to_bytes::<rancor::Error>(&snapshot)
            .map_err(|e| Error::Store(format!("serialize: {e}")))?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            "Saved artifact snapshot: {} documents, {} bytes",
            snapshot.documents.len(),
            bytes.len()
        );

        Ok(())
    }

    /// Load the artifact snapshot.
    ///
    /// Returns `Ok(None)` if the snapshot file doesn't exist.
    /// Returns `Err` if it exists but is unreadable or from another format version.
    pub fn load(&self) -> Result<Option<BuildArtifact>> {
        if !self.path.exists() {
            tracing::debug!("No artifact snapshot at {:?}", self.path);
            return Ok(None);
        }

        let mut file = fs::File::open(&self.path)?;
        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;

        let mut bytes = AlignedVec::<16>::new();
        bytes.extend_from_slice(&raw);

        let archived = rkyv::access::<ArchivedArtifactSnapshot, rancor::Error>(&bytes)
            .map_err(|e| Error::Store(format!("decode: {e}")))?;

        let found_version: u32 = archived.version.into();
        if found_version != SNAPSHOT_VERSION {
            return Err(Error::Store(format!(
                "snapshot version mismatch: expected {SNAPSHOT_VERSION}, found {found_version}"
            )));
        }

        let snapshot = rkyv::deserialize::<ArtifactSnapshot, rancor::Error>(archived)
            .map_err(|e| Error::Store(format!("decode: {e}")))?;

        tracing::debug!(
            "Loaded artifact snapshot: {} documents, created at {}",
            snapshot.documents.len(),
            snapshot.created_at
        );

        Ok(Some(snapshot.into()))
    }

    /// Delete the snapshot file if it exists.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::debug!("Removed artifact snapshot at {:?}", self.path);
        }
        Ok(())
    }
}
