//! Filesystem watcher for a project directory.
//!
//! Translates raw `notify` events into [`ChangeEvent`]s and pushes them onto
//! a channel. The directory is watched non-recursively.

use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::event::ChangeEvent;

/// Map one OS notification to change events, one per affected path.
///
/// Renames are reported by their old name. A rename notification that only
/// carries the new name produces nothing. Access events are dropped.
pub fn change_events(event: &notify::Event) -> Vec<ChangeEvent> {
    let each = |make: fn(PathBuf) -> ChangeEvent| -> Vec<ChangeEvent> {
        event.paths.iter().cloned().map(make).collect()
    };

    match &event.kind {
        EventKind::Create(_) => each(ChangeEvent::Created),
        EventKind::Remove(_) => each(ChangeEvent::Deleted),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::To => Vec::new(),
            RenameMode::Both => event
                .paths
                .first()
                .map(|old| vec![ChangeEvent::Renamed { old: old.clone() }])
                .unwrap_or_default(),
            RenameMode::From | RenameMode::Any | RenameMode::Other => {
                each(|old| ChangeEvent::Renamed { old })
            }
        },
        EventKind::Modify(_) | EventKind::Any => each(ChangeEvent::Changed),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

/// Watcher handle. Dropping it stops the notifications and closes the channel.
pub struct ProjectWatcher {
    /// Underlying watcher (kept alive to maintain the watch).
    _watcher: notify::RecommendedWatcher,
    root: PathBuf,
}

impl ProjectWatcher {
    /// Start watching `dir` (top level only).
    ///
    /// Returns the handle and the receiving end of the event channel.
    pub fn new(dir: impl AsRef<Path>) -> Result<(Self, mpsc::UnboundedReceiver<ChangeEvent>)> {
        let root = dir.as_ref().to_path_buf();
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            match result {
                Ok(event) => {
                    for change in change_events(&event) {
                        // Receiver gone means the cache was dropped.
                        tx.send(change).ok();
                    }
                }
                Err(e) => tracing::warn!("File watch error: {}", e),
            }
        })
        .map_err(|e| Error::Watch(e.to_string()))?;

        watcher
            .watch(&root, RecursiveMode::NonRecursive)
            .map_err(|e| Error::Watch(format!("{}: {}", root.display(), e)))?;

        tracing::debug!("Watching {}", root.display());

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// The watched directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, RemoveKind};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn event(kind: EventKind, paths: &[&str]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |e, p| e.add_path(PathBuf::from(p)))
    }

    #[test]
    fn test_create_and_remove() {
        assert_eq!(
            change_events(&event(EventKind::Create(CreateKind::File), &["/p/A.cs"])),
            vec![ChangeEvent::Created(PathBuf::from("/p/A.cs"))]
        );
        assert_eq!(
            change_events(&event(EventKind::Remove(RemoveKind::Any), &["/p/A.cs", "/p/B.cs"])),
            vec![
                ChangeEvent::Deleted(PathBuf::from("/p/A.cs")),
                ChangeEvent::Deleted(PathBuf::from("/p/B.cs")),
            ]
        );
    }

    #[test]
    fn test_data_modification_is_changed() {
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Content));
        assert_eq!(
            change_events(&event(kind, &["/p/A.cs"])),
            vec![ChangeEvent::Changed(PathBuf::from("/p/A.cs"))]
        );
    }

    #[test]
    fn test_rename_reports_old_name_only() {
        let both = EventKind::Modify(ModifyKind::Name(RenameMode::Both));
        assert_eq!(
            change_events(&event(both, &["/p/Old.txt", "/p/New.cs"])),
            vec![ChangeEvent::Renamed {
                old: PathBuf::from("/p/Old.txt")
            }]
        );

        let from = EventKind::Modify(ModifyKind::Name(RenameMode::From));
        assert_eq!(
            change_events(&event(from, &["/p/Old.txt"])),
            vec![ChangeEvent::Renamed {
                old: PathBuf::from("/p/Old.txt")
            }]
        );

        let to = EventKind::Modify(ModifyKind::Name(RenameMode::To));
        assert!(change_events(&event(to, &["/p/New.cs"])).is_empty());
    }

    #[test]
    fn test_access_is_dropped() {
        let kind = EventKind::Access(AccessKind::Any);
        assert!(change_events(&event(kind, &["/p/A.cs"])).is_empty());
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let result = ProjectWatcher::new(temp.path().join("missing"));
        assert!(matches!(result, Err(Error::Watch(_))));
    }

    #[tokio::test]
    async fn test_watcher_reports_created_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let (watcher, mut rx) = ProjectWatcher::new(&root).unwrap();
        assert_eq!(watcher.root(), root.as_path());

        fs::write(root.join("New.cs"), "class C {}").unwrap();

        let found = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = rx.recv().await {
                if event.path().ends_with("New.cs") {
                    return Some(event);
                }
            }
            None
        })
        .await
        .unwrap();

        assert!(found.is_some());
    }
}
