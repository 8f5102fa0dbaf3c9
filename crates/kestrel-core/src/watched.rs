//! A build cache that watches its project directory.
//!
//! [`WatchedBuildCache`] wraps a [`BuildCache`]: it delegates the build and,
//! once a build has succeeded, arms a [`ProjectWatcher`] whose events are
//! drained by a single task that applies them to the inner cache.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::artifact::{BuildArtifact, Workspace};
use crate::cache::BuildCache;
use crate::event::ChangeEvent;
use crate::error::Result;
use crate::watcher::ProjectWatcher;

/// Capacity of the invalidation broadcast channel.
const INVALIDATION_CHANNEL_CAPACITY: usize = 64;

enum WatchState {
    /// Not armed yet.
    Idle,
    /// Watching; dropping this stops the watcher and ends the task.
    Armed {
        _watcher: ProjectWatcher,
        task: JoinHandle<()>,
    },
    /// Arming was attempted and failed. Not retried.
    Failed,
    /// Watching disabled by configuration.
    Disabled,
}

/// [`BuildCache`] plus filesystem watching.
pub struct WatchedBuildCache {
    inner: Arc<BuildCache>,
    watch: Mutex<WatchState>,
    invalidations: broadcast::Sender<ChangeEvent>,
}

impl WatchedBuildCache {
    pub fn new(inner: BuildCache) -> Self {
        let watch = if inner.config().watch {
            WatchState::Idle
        } else {
            WatchState::Disabled
        };
        let (invalidations, _) = broadcast::channel(INVALIDATION_CHANNEL_CAPACITY);

        Self {
            inner: Arc::new(inner),
            watch: Mutex::new(watch),
            invalidations,
        }
    }

    /// The wrapped cache.
    pub fn inner(&self) -> &Arc<BuildCache> {
        &self.inner
    }

    /// Build if needed, then arm watching.
    pub async fn ensure_built(&self) -> Result<Arc<BuildArtifact>> {
        let artifact = self.inner.ensure_built().await?;
        self.arm();
        Ok(artifact)
    }

    /// Build and derive the workspace if needed, then arm watching.
    pub async fn ensure_ready(&self) -> Result<Arc<Workspace>> {
        let workspace = self.inner.ensure_ready().await?;
        self.arm();
        Ok(workspace)
    }

    /// Receive every change event that invalidated the cache.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.invalidations.subscribe()
    }

    /// Whether a watcher is currently armed.
    pub fn is_watching(&self) -> bool {
        matches!(*self.watch_state(), WatchState::Armed { .. })
    }

    fn watch_state(&self) -> std::sync::MutexGuard<'_, WatchState> {
        self.watch.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Arm the watcher once. Failures are logged and absorbed.
    fn arm(&self) {
        let mut state = self.watch_state();
        if !matches!(*state, WatchState::Idle) {
            return;
        }

        let project_dir = self.inner.project_dir();
        *state = match ProjectWatcher::new(project_dir) {
            Ok((watcher, rx)) => {
                let task = tokio::spawn(drain_events(
                    Arc::clone(&self.inner),
                    rx,
                    self.invalidations.clone(),
                ));
                tracing::debug!("Armed watcher for {}", project_dir.display());
                WatchState::Armed {
                    _watcher: watcher,
                    task,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Could not watch {}; changes will not invalidate the build: {}",
                    project_dir.display(),
                    e
                );
                WatchState::Failed
            }
        };
    }
}

impl Drop for WatchedBuildCache {
    fn drop(&mut self) {
        if let WatchState::Armed { task, .. } = &*self.watch_state() {
            task.abort();
        }
    }
}

/// Apply change events to the cache, one at a time.
async fn drain_events(
    cache: Arc<BuildCache>,
    mut rx: mpsc::UnboundedReceiver<ChangeEvent>,
    invalidations: broadcast::Sender<ChangeEvent>,
) {
    while let Some(event) = rx.recv().await {
        if cache.on_change(&event) {
            // No subscribers is fine.
            invalidations.send(event).ok();
        }
    }
    tracing::debug!("Watch channel closed for {}", cache.project_dir().display());
}
