//! Core engine for Kestrel project packages.
//!
//! This crate provides:
//! - A build-result cache that is invalidated by filesystem changes
//! - File classification and the invalidation policy
//! - Project directory watching
//! - The external build step and artifact persistence
//!
//! # Architecture
//!
//! ```text
//! notify ──► ProjectWatcher ──► mpsc ──► drain task ──► BuildCache::on_change
//!                                                          │
//! caller ──► WatchedBuildCache::ensure_ready ──► BuildCache::ensure_ready
//!                                                          │
//!                                                          └──► BuildInvoker (spawn_blocking)
//! ```

pub mod artifact;
pub mod build;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod event;
pub mod paths;
pub mod scan;
pub mod staleness;
pub mod store;
pub mod watched;
pub mod watcher;

pub use artifact::{BuildArtifact, Document, Language, Workspace};
pub use build::{BuildCommand, BuildInvoker, CommandBuilder};
pub use cache::{BuildCache, CacheStatus, should_invalidate};
pub use classify::FileClassification;
pub use config::CacheConfig;
pub use error::{Error, Result};
pub use event::ChangeEvent;
pub use paths::ProjectDirs;
pub use staleness::needs_update;
pub use store::ArtifactStore;
pub use watched::WatchedBuildCache;
pub use watcher::ProjectWatcher;
