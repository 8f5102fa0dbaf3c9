//! Filesystem change notifications.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classify::FileClassification;

/// A single change notification for a file in the project directory.
///
/// Delivery is best-effort: events may arrive out of order, be duplicated,
/// or be dropped by the OS facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// File contents or metadata changed.
    Changed(PathBuf),
    /// File was created.
    Created(PathBuf),
    /// File was deleted.
    Deleted(PathBuf),
    /// File was renamed. Only the old name is carried.
    Renamed {
        /// Name before the rename.
        old: PathBuf,
    },
}

impl ChangeEvent {
    /// The path the invalidation policy looks at.
    ///
    /// For renames this is the old path.
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Created(path) | Self::Deleted(path) => path,
            Self::Renamed { old } => old,
        }
    }

    /// Classification of [`path`](Self::path).
    pub fn classification(&self) -> FileClassification {
        FileClassification::of_path(self.path())
    }

    /// Whether the event carries a usable file name.
    ///
    /// Events failing this check are treated as no-ops.
    pub fn is_well_formed(&self) -> bool {
        self.path()
            .file_name()
            .is_some_and(|name| !name.is_empty())
    }

    /// Short lowercase label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Changed(_) => "changed",
            Self::Created(_) => "created",
            Self::Deleted(_) => "deleted",
            Self::Renamed { .. } => "renamed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_uses_old_path() {
        let event = ChangeEvent::Renamed {
            old: PathBuf::from("/proj/Old.txt"),
        };
        assert_eq!(event.path(), Path::new("/proj/Old.txt"));
        assert_eq!(event.classification(), FileClassification::Other);
    }

    #[test]
    fn test_malformed_paths() {
        assert!(!ChangeEvent::Changed(PathBuf::new()).is_well_formed());
        assert!(!ChangeEvent::Deleted(PathBuf::from("..")).is_well_formed());
        assert!(ChangeEvent::Created(PathBuf::from("A.cs")).is_well_formed());
    }

    #[test]
    fn test_labels() {
        assert_eq!(ChangeEvent::Created(PathBuf::from("A.cs")).label(), "created");
        assert_eq!(ChangeEvent::Changed(PathBuf::from("A.cs")).label(), "changed");
        assert_eq!(ChangeEvent::Deleted(PathBuf::from("A.cs")).label(), "deleted");
        assert_eq!(ChangeEvent::Renamed { old: PathBuf::from("A.cs") }.label(), "renamed");
    }
}
