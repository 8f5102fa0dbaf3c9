//! The build-result invalidation cache.
//!
//! A [`BuildCache`] holds at most one valid [`BuildArtifact`] for a project
//! directory, plus the [`Workspace`] derived from it. File change
//! notifications invalidate both; the next `ensure_built`/`ensure_ready`
//! call rebuilds.
//!
//! # Concurrency
//!
//! Artifact, workspace and a generation counter live behind one mutex, so an
//! invalidation clears the pair in a single transition. Builds are
//! serialized by a separate async guard: concurrent callers wait for the
//! build in flight and then see its result. A build records the generation
//! it started from and its result is discarded if any invalidation happened
//! in the meantime. A failed build is returned to every caller that was
//! waiting on it.
//!
//! A build abandoned by a timeout keeps the build slot: the next build waits
//! for it to finish before starting.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::artifact::{BuildArtifact, Workspace};
use crate::build::BuildInvoker;
use crate::classify::FileClassification;
use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::event::ChangeEvent;
use crate::staleness;
use crate::store::ArtifactStore;

/// Decide whether an event invalidates the cache.
///
/// | Event | Classification | Invalidate |
/// |---|---|---|
/// | Created | project or code file | always |
/// | Changed / Deleted / Renamed | project, code or build log file | only if an artifact exists |
/// | any | other | never |
///
/// Renames are judged by their old name only.
pub fn should_invalidate(
    event: &ChangeEvent,
    classification: FileClassification,
    has_artifact: bool,
) -> bool {
    match (event, classification) {
        (_, FileClassification::Other) => false,
        (ChangeEvent::Created(_), classification) => classification.is_source(),
        (ChangeEvent::Changed(_) | ChangeEvent::Deleted(_) | ChangeEvent::Renamed { .. }, _) => {
            has_artifact
        }
    }
}

/// Point-in-time view of the cache, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatus {
    /// Number of invalidations so far.
    pub generation: u64,
    pub has_artifact: bool,
    pub has_workspace: bool,
    /// Number of builds started over the cache's lifetime.
    pub builds_started: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    generation: u64,
    artifact: Option<Arc<BuildArtifact>>,
    workspace: Option<Arc<Workspace>>,
    /// Number of failed builds so far.
    failures: u64,
    /// Most recent failure, with the generation its build started from.
    last_failure: Option<(u64, Error)>,
}

impl CacheState {
    /// Drop artifact and workspace together and start a new generation.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.artifact = None;
        self.workspace = None;
    }
}

/// Lazily built artifact and workspace for one project directory.
pub struct BuildCache {
    project_dir: PathBuf,
    config: CacheConfig,
    invoker: Arc<dyn BuildInvoker>,
    store: Option<ArtifactStore>,
    state: Mutex<CacheState>,
    /// Held for the duration of a build (single flight).
    build_guard: tokio::sync::Mutex<()>,
    /// A timed-out build that may still be running.
    abandoned: Mutex<Option<JoinHandle<Result<BuildArtifact>>>>,
    builds_started: AtomicU64,
}

impl BuildCache {
    /// Create a cache for `project_dir`.
    ///
    /// When `config.artifact_path` is set, a persisted snapshot is loaded and
    /// kept only if it still matches the code files on disk.
    pub fn new(
        project_dir: impl AsRef<Path>,
        invoker: impl BuildInvoker,
        config: CacheConfig,
    ) -> Result<Self> {
        let store = config.artifact_path.clone().map(ArtifactStore::new);
        let existing = match &store {
            Some(store) => store.load().unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable artifact snapshot: {}", e);
                None
            }),
            None => None,
        };

        Self::build_with(project_dir.as_ref(), Arc::new(invoker), config, store, existing)
    }

    /// Create a cache with an artifact already attached.
    ///
    /// The artifact goes through the same staleness check as a persisted one.
    pub fn with_artifact(
        project_dir: impl AsRef<Path>,
        invoker: impl BuildInvoker,
        config: CacheConfig,
        artifact: BuildArtifact,
    ) -> Result<Self> {
        let store = config.artifact_path.clone().map(ArtifactStore::new);
        Self::build_with(project_dir.as_ref(), Arc::new(invoker), config, store, Some(artifact))
    }

    fn build_with(
        project_dir: &Path,
        invoker: Arc<dyn BuildInvoker>,
        config: CacheConfig,
        store: Option<ArtifactStore>,
        existing: Option<BuildArtifact>,
    ) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .map_err(|_| Error::NotADirectory(project_dir.to_path_buf()))?;
        if !project_dir.is_dir() {
            return Err(Error::NotADirectory(project_dir));
        }

        let artifact = existing.and_then(|artifact| {
            match staleness::needs_update(&project_dir, &artifact) {
                Ok(false) => {
                    tracing::debug!("Reusing existing artifact for {}", project_dir.display());
                    Some(Arc::new(artifact))
                }
                Ok(true) => {
                    tracing::info!(
                        "Existing artifact for {} is out of date, resetting",
                        project_dir.display()
                    );
                    None
                }
                Err(e) => {
                    tracing::warn!("Staleness check failed, resetting: {}", e);
                    None
                }
            }
        });

        if artifact.is_none()
            && let Some(store) = &store
            && let Err(e) = store.remove()
        {
            tracing::warn!("Failed to remove stale artifact snapshot: {}", e);
        }

        Ok(Self {
            project_dir,
            config,
            invoker,
            store,
            state: Mutex::new(CacheState {
                artifact,
                ..CacheState::default()
            }),
            build_guard: tokio::sync::Mutex::new(()),
            abandoned: Mutex::new(None),
            builds_started: AtomicU64::new(0),
        })
    }

    /// The canonical project directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        // The state is always left consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The current artifact, if valid.
    pub fn current_artifact(&self) -> Option<Arc<BuildArtifact>> {
        self.state().artifact.clone()
    }

    /// The current workspace, if derived and valid.
    pub fn current_workspace(&self) -> Option<Arc<Workspace>> {
        self.state().workspace.clone()
    }

    pub fn status(&self) -> CacheStatus {
        let state = self.state();
        CacheStatus {
            generation: state.generation,
            has_artifact: state.artifact.is_some(),
            has_workspace: state.workspace.is_some(),
            builds_started: self.builds_started.load(Ordering::SeqCst),
        }
    }

    /// Return the valid artifact, building it first if necessary.
    ///
    /// Only one build runs at a time; callers arriving while a build is in
    /// flight wait for it and share its result. A result invalidated while it
    /// was being built is discarded and the build is retried.
    ///
    /// # Errors
    /// Build failures and timeouts are returned to the caller. The cache is
    /// left without an artifact so the next call retries.
    pub async fn ensure_built(&self) -> Result<Arc<BuildArtifact>> {
        let failures_seen = {
            let state = self.state();
            if let Some(artifact) = &state.artifact {
                return Ok(Arc::clone(artifact));
            }
            state.failures
        };

        let _guard = self.build_guard.lock().await;
        let mut attempts: u32 = 0;

        loop {
            let generation = {
                let state = self.state();
                if let Some(artifact) = &state.artifact {
                    return Ok(Arc::clone(artifact));
                }
                // The build this caller waited on failed and nothing changed since.
                if attempts == 0
                    && state.failures > failures_seen
                    && let Some((failed_generation, error)) = &state.last_failure
                    && *failed_generation == state.generation
                {
                    return Err(error.clone());
                }
                state.generation
            };

            attempts += 1;
            let artifact = match self.run_build().await {
                Ok(artifact) => artifact,
                Err(e) => {
                    let mut state = self.state();
                    state.failures += 1;
                    state.last_failure = Some((generation, e.clone()));
                    return Err(e);
                }
            };

            // Snapshot before publishing; a concurrent invalidation removes it.
            self.persist(&artifact);

            let artifact = {
                let mut state = self.state();
                if state.generation != generation {
                    None
                } else {
                    let artifact = Arc::new(artifact);
                    state.artifact = Some(Arc::clone(&artifact));
                    Some(artifact)
                }
            };

            match artifact {
                Some(artifact) => return Ok(artifact),
                None => {
                    self.forget_snapshot();
                    tracing::debug!(
                        "Discarding build of {}: files changed while it ran (attempt {})",
                        self.project_dir.display(),
                        attempts
                    );
                    if attempts > self.config.max_stale_rebuilds {
                        return Err(Error::Superseded { attempts });
                    }
                }
            }
        }
    }

    /// Return the workspace, building and deriving it first if necessary.
    pub async fn ensure_ready(&self) -> Result<Arc<Workspace>> {
        let mut attempts: u32 = 0;

        loop {
            let artifact = self.ensure_built().await?;
            attempts += 1;

            let mut state = self.state();
            if let Some(workspace) = &state.workspace {
                return Ok(Arc::clone(workspace));
            }

            // Derive only from the artifact that is still current.
            if state
                .artifact
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &artifact))
            {
                let workspace = Arc::new(Workspace::from_artifact(&artifact));
                state.workspace = Some(Arc::clone(&workspace));
                tracing::debug!(
                    "Workspace ready for {}: {} documents",
                    self.project_dir.display(),
                    workspace.document_count()
                );
                return Ok(workspace);
            }

            if attempts > self.config.max_stale_rebuilds {
                return Err(Error::Superseded { attempts });
            }
        }
    }

    /// Apply the invalidation policy to one change notification.
    ///
    /// Returns true if the cache was invalidated. Malformed events are ignored.
    pub fn on_change(&self, event: &ChangeEvent) -> bool {
        if !event.is_well_formed() {
            tracing::trace!("Ignoring malformed change event: {:?}", event);
            return false;
        }

        let classification = event.classification();
        let mut state = self.state();

        if !should_invalidate(event, classification, state.artifact.is_some()) {
            tracing::trace!(
                "Ignoring {} {} ({:?})",
                event.label(),
                event.path().display(),
                classification
            );
            return false;
        }

        state.invalidate();
        tracing::debug!(
            "Invalidated {} on {} {} (generation {})",
            self.project_dir.display(),
            event.label(),
            event.path().display(),
            state.generation
        );
        drop(state);

        self.forget_snapshot();
        true
    }

    /// Drop the artifact, workspace and persisted snapshot unconditionally.
    pub fn invalidate(&self) {
        self.state().invalidate();
        self.forget_snapshot();
    }

    /// Whether the current artifact no longer matches the files on disk.
    ///
    /// Without an artifact the answer is always yes.
    pub fn needs_update(&self) -> Result<bool> {
        match self.current_artifact() {
            Some(artifact) => staleness::needs_update(&self.project_dir, &artifact),
            None => Ok(true),
        }
    }

    fn abandoned_build(&self) -> MutexGuard<'_, Option<JoinHandle<Result<BuildArtifact>>>> {
        self.abandoned.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait for a build abandoned by an earlier timeout.
    ///
    /// Its result is discarded. Still running after another timeout period
    /// is reported as [`Error::BuildTimeout`] without starting a new build.
    async fn wait_for_abandoned(&self) -> Result<()> {
        let Some(mut task) = self.abandoned_build().take() else {
            return Ok(());
        };

        let finished = match self.config.build_timeout {
            Some(timeout) => tokio::time::timeout(timeout, &mut task).await.is_ok(),
            None => {
                // Finished, whether or not it panicked.
                (&mut task).await.ok();
                true
            }
        };

        if !finished {
            *self.abandoned_build() = Some(task);
            return Err(self.timeout_error());
        }

        tracing::debug!(
            "Abandoned build of {} finished; discarding its result",
            self.project_dir.display()
        );
        Ok(())
    }

    fn timeout_error(&self) -> Error {
        Error::BuildTimeout {
            project: self.project_dir.clone(),
            timeout: self.config.build_timeout.unwrap_or_default(),
        }
    }

    async fn run_build(&self) -> Result<BuildArtifact> {
        self.wait_for_abandoned().await?;
        self.builds_started.fetch_add(1, Ordering::SeqCst);

        let invoker = Arc::clone(&self.invoker);
        let project_dir = self.project_dir.clone();
        let mut task = tokio::task::spawn_blocking(move || invoker.build(&project_dir));

        let joined = match self.config.build_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(
                        "Build of {} exceeded {:?}, abandoning",
                        self.project_dir.display(),
                        timeout
                    );
                    *self.abandoned_build() = Some(task);
                    return Err(self.timeout_error());
                }
            },
            None => task.await,
        };

        let result = joined.map_err(|e| Error::Build {
            project: self.project_dir.clone(),
            message: format!("build task failed: {e}"),
        })?;

        if let Err(e) = &result {
            tracing::warn!("Build of {} failed: {}", self.project_dir.display(), e);
        }
        result
    }

    fn forget_snapshot(&self) {
        if let Some(store) = &self.store
            && let Err(e) = store.remove()
        {
            tracing::warn!("Failed to remove artifact snapshot: {}", e);
        }
    }

    fn persist(&self, artifact: &BuildArtifact) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(artifact)
        {
            tracing::warn!("Failed to persist artifact snapshot: {}", e);
        }
    }
}

impl std::fmt::Debug for BuildCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildCache")
            .field("project_dir", &self.project_dir)
            .field("status", &self.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::TempDir;

    fn created(name: &str) -> ChangeEvent {
        ChangeEvent::Created(PathBuf::from(name))
    }

    fn changed(name: &str) -> ChangeEvent {
        ChangeEvent::Changed(PathBuf::from(name))
    }

    /// Invoker that scans the directory and counts calls.
    fn counting(counter: Arc<AtomicUsize>) -> impl BuildInvoker {
        move |dir: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            BuildArtifact::scan(dir)
        }
    }

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            fs::write(temp.path().join(file), "").unwrap();
        }
        temp
    }

    #[test]
    fn test_policy_created() {
        for name in ["A.cs", "B.fs", "App.csproj", "Lib.fsproj"] {
            assert!(should_invalidate(&created(name), FileClassification::of_name(name), false));
            assert!(should_invalidate(&created(name), FileClassification::of_name(name), true));
        }
        for name in ["notes.txt", "msbuild.binlog"] {
            assert!(!should_invalidate(&created(name), FileClassification::of_name(name), true));
        }
    }

    #[test]
    fn test_policy_requires_artifact_for_other_kinds() {
        let events = [
            changed("A.cs"),
            ChangeEvent::Deleted(PathBuf::from("App.csproj")),
            ChangeEvent::Renamed {
                old: PathBuf::from("msbuild.binlog"),
            },
        ];
        for event in &events {
            let classification = event.classification();
            assert!(!should_invalidate(event, classification, false));
            assert!(should_invalidate(event, classification, true));
        }
    }

    #[test]
    fn test_policy_ignores_other_files() {
        for event in [created("x.txt"), changed("x.txt"), ChangeEvent::Deleted(PathBuf::from("x.json"))] {
            assert!(!should_invalidate(&event, FileClassification::Other, true));
        }
    }

    #[tokio::test]
    async fn test_first_build_runs_once() {
        let temp = project(&["A.cs"]);
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = BuildCache::new(temp.path(), counting(counter.clone()), CacheConfig::ephemeral())
            .unwrap();

        assert_eq!(cache.status().generation, 0);
        assert!(!cache.status().has_artifact);

        cache.ensure_built().await.unwrap();
        cache.ensure_built().await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ensure_ready_derives_workspace_once() {
        let temp = project(&["A.cs", "B.cs"]);
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = BuildCache::new(temp.path(), counting(counter.clone()), CacheConfig::ephemeral())
            .unwrap();

        let first = cache.ensure_ready().await.unwrap();
        let second = cache.ensure_ready().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.document_count(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidation_clears_workspace_with_artifact() {
        let temp = project(&["A.cs"]);
        let counter = Arc::new(AtomicUsize::new(0));
        let cache = BuildCache::new(temp.path(), counting(counter.clone()), CacheConfig::ephemeral())
            .unwrap();

        cache.ensure_ready().await.unwrap();
        assert!(cache.on_change(&changed("A.cs")));

        let status = cache.status();
        assert!(!status.has_artifact);
        assert!(!status.has_workspace);
        assert_eq!(status.generation, 1);
    }

    #[tokio::test]
    async fn test_build_failure_leaves_no_artifact() {
        let temp = project(&["A.cs"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let invoker = move |dir: &Path| -> Result<BuildArtifact> {
            if calls_in.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Build {
                    project: dir.to_path_buf(),
                    message: "error CS1002: ; expected".to_string(),
                })
            } else {
                BuildArtifact::scan(dir)
            }
        };
        let cache = BuildCache::new(temp.path(), invoker, CacheConfig::ephemeral()).unwrap();

        let err = cache.ensure_built().await.unwrap_err();
        assert!(err.is_build_failure());
        assert!(cache.current_artifact().is_none());

        cache.ensure_built().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_build_timeout() {
        let temp = project(&[]);
        let invoker = |dir: &Path| -> Result<BuildArtifact> {
            std::thread::sleep(Duration::from_millis(500));
            Ok(BuildArtifact::new(dir))
        };
        let config = CacheConfig::ephemeral().with_timeout(Duration::from_millis(20));
        let cache = BuildCache::new(temp.path(), invoker, config).unwrap();

        let err = cache.ensure_built().await.unwrap_err();
        assert!(matches!(err, Error::BuildTimeout { .. }));
        assert!(cache.current_artifact().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timed_out_build_keeps_the_build_slot() {
        let temp = project(&[]);
        let calls = Arc::new(AtomicUsize::new(0));
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (calls_in, running_in, peak_in) = (calls.clone(), running.clone(), peak.clone());
        let invoker = move |dir: &Path| -> Result<BuildArtifact> {
            calls_in.fetch_add(1, Ordering::SeqCst);
            let now = running_in.fetch_add(1, Ordering::SeqCst) + 1;
            peak_in.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(400));
            running_in.fetch_sub(1, Ordering::SeqCst);
            Ok(BuildArtifact::new(dir))
        };
        let config = CacheConfig::ephemeral().with_timeout(Duration::from_millis(50));
        let cache = BuildCache::new(temp.path(), invoker, config).unwrap();

        // The second call finds the first build still running and does not start another.
        for _ in 0..2 {
            let err = cache.ensure_built().await.unwrap_err();
            assert!(matches!(err, Error::BuildTimeout { .. }));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(cache.ensure_built().await.is_err());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiting_callers_share_a_failed_build() {
        let temp = project(&["A.cs"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let invoker = move |dir: &Path| -> Result<BuildArtifact> {
            calls_in.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(100));
            Err(Error::Build {
                project: dir.to_path_buf(),
                message: "error CS0103: name does not exist".to_string(),
            })
        };
        let cache = Arc::new(BuildCache::new(temp.path(), invoker, CacheConfig::ephemeral()).unwrap());

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.ensure_built().await })
            })
            .collect();

        for caller in callers {
            let err = caller.await.unwrap().unwrap_err();
            assert!(matches!(err, Error::Build { ref message, .. } if message.contains("CS0103")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A caller arriving after the failure builds again.
        assert!(cache.ensure_built().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidation_after_failure_is_not_shared() {
        let temp = project(&["A.cs"]);
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in = calls.clone();
        let invoker = move |dir: &Path| -> Result<BuildArtifact> {
            if calls_in.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::ToolNotFound("dotnet".to_string()))
            } else {
                BuildArtifact::scan(dir)
            }
        };
        let cache = BuildCache::new(temp.path(), invoker, CacheConfig::ephemeral()).unwrap();

        assert!(cache.ensure_built().await.is_err());
        assert!(cache.on_change(&created("B.cs")));
        cache.ensure_built().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_superseded_after_repeated_invalidation() {
        let temp = project(&[]);
        let cache_slot: Arc<Mutex<Option<Arc<BuildCache>>>> = Arc::new(Mutex::new(None));
        let slot = cache_slot.clone();
        let invoker = move |dir: &Path| -> Result<BuildArtifact> {
            // Every build sees a new file appear before it finishes.
            if let Some(cache) = slot.lock().unwrap().as_ref() {
                cache.on_change(&ChangeEvent::Created(dir.join("Churn.cs")));
            }
            Ok(BuildArtifact::new(dir))
        };
        let config = CacheConfig {
            max_stale_rebuilds: 2,
            ..CacheConfig::ephemeral()
        };
        let cache = Arc::new(BuildCache::new(temp.path(), invoker, config).unwrap());
        *cache_slot.lock().unwrap() = Some(cache.clone());

        let err = cache.ensure_built().await.unwrap_err();
        assert!(matches!(err, Error::Superseded { attempts: 3 }));
        assert_eq!(cache.status().builds_started, 3);
        assert!(cache.current_artifact().is_none());

        // Break the cycle.
        cache_slot.lock().unwrap().take();
    }

    #[test]
    fn test_malformed_event_is_ignored() {
        let temp = project(&["A.cs"]);
        let root = temp.path().canonicalize().unwrap();
        let artifact = BuildArtifact::new(&root).with_documents([root.join("A.cs")]);
        let cache = BuildCache::with_artifact(
            temp.path(),
            |dir: &Path| BuildArtifact::scan(dir),
            CacheConfig::ephemeral(),
            artifact,
        )
        .unwrap();

        assert!(!cache.on_change(&ChangeEvent::Changed(PathBuf::new())));
        assert!(!cache.on_change(&ChangeEvent::Deleted(PathBuf::from(".."))));
        assert!(cache.status().has_artifact);
    }

    #[test]
    fn test_needs_update_without_artifact() {
        let temp = project(&["A.cs"]);
        let cache = BuildCache::new(
            temp.path(),
            |dir: &Path| BuildArtifact::scan(dir),
            CacheConfig::ephemeral(),
        )
        .unwrap();
        assert!(cache.needs_update().unwrap());
    }

    #[test]
    fn test_missing_project_directory() {
        let temp = TempDir::new().unwrap();
        let result = BuildCache::new(
            temp.path().join("missing"),
            |dir: &Path| BuildArtifact::scan(dir),
            CacheConfig::ephemeral(),
        );
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }
}
