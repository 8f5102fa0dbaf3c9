//! The project package: a watched build cache that reports on the event bus.

use std::path::Path;
use std::sync::{Arc, Mutex};

use kestrel_core::{
    BuildCache, BuildCommand, CacheConfig, ChangeEvent, CommandBuilder, ProjectDirs,
    WatchedBuildCache, Workspace,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::EventBus;
use crate::error::KernelResult;
use crate::events::{CommandId, KernelEvent};

struct Relay {
    /// Subscribed at construction so no invalidation is missed.
    pending: Option<broadcast::Receiver<ChangeEvent>>,
    task: Option<JoinHandle<()>>,
}

/// A project directory loaded into the kernel.
pub struct ProjectPackage {
    cache: WatchedBuildCache,
    bus: EventBus,
    relay: Mutex<Relay>,
}

impl ProjectPackage {
    /// Open `project_dir` with the `dotnet build` invoker and a persisted
    /// artifact under `.kestrel/`.
    pub fn open(project_dir: impl AsRef<Path>, bus: EventBus) -> KernelResult<Self> {
        let dirs = ProjectDirs::create(project_dir.as_ref())?;
        let invoker = CommandBuilder::new(BuildCommand::dotnet(&dirs));
        let cache = BuildCache::new(&dirs.project_dir, invoker, CacheConfig::for_project(&dirs))?;
        Ok(Self::with_cache(cache, bus))
    }

    pub fn with_cache(cache: BuildCache, bus: EventBus) -> Self {
        let cache = WatchedBuildCache::new(cache);
        let relay = Relay {
            pending: Some(cache.subscribe()),
            task: None,
        };
        Self {
            cache,
            bus,
            relay: Mutex::new(relay),
        }
    }

    pub fn project_dir(&self) -> &Path {
        self.cache.inner().project_dir()
    }

    pub fn cache(&self) -> &WatchedBuildCache {
        &self.cache
    }

    /// Build if needed and return the workspace.
    ///
    /// The outcome is published as [`KernelEvent::ProjectBuilt`] or
    /// [`KernelEvent::ProjectBuildFailed`].
    pub async fn ensure_ready(&self, command_id: &CommandId) -> KernelResult<Arc<Workspace>> {
        let project_dir = self.project_dir().display().to_string();

        match self.cache.ensure_ready().await {
            Ok(workspace) => {
                self.start_relay();
                self.bus.publish(KernelEvent::ProjectBuilt {
                    command_id: command_id.clone(),
                    project_dir,
                    project_name: workspace.project_name().to_string(),
                    documents: workspace
                        .document_paths()
                        .map(|p| p.display().to_string())
                        .collect(),
                });
                Ok(workspace)
            }
            Err(e) => {
                tracing::debug!("Project build failed for {}: {}", project_dir, e);
                self.bus.publish(KernelEvent::ProjectBuildFailed {
                    command_id: command_id.clone(),
                    project_dir,
                    message: e.with_hint(),
                });
                Err(e.into())
            }
        }
    }

    fn start_relay(&self) {
        let mut relay = self.relay.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(rx) = relay.pending.take() {
            relay.task = Some(tokio::spawn(relay_invalidations(
                rx,
                self.bus.clone(),
                self.project_dir().display().to_string(),
            )));
        }
    }
}

impl Drop for ProjectPackage {
    fn drop(&mut self) {
        let relay = self.relay.get_mut().unwrap_or_else(|p| p.into_inner());
        if let Some(task) = relay.task.take() {
            task.abort();
        }
    }
}

async fn relay_invalidations(
    mut rx: broadcast::Receiver<ChangeEvent>,
    bus: EventBus,
    project_dir: String,
) {
    loop {
        match rx.recv().await {
            Ok(event) => bus.publish(KernelEvent::ProjectInvalidated {
                project_dir: project_dir.clone(),
                change: event.label().to_string(),
                path: event.path().display().to_string(),
            }),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Skipped {} invalidation notices for {}", skipped, project_dir);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
