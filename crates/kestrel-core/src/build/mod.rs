//! The external build step.
//!
//! The cache never builds anything itself; it calls a [`BuildInvoker`].
//! [`CommandBuilder`] runs an external tool such as `dotnet build`.

mod command;

pub use command::{BuildCommand, CommandBuilder};

use std::path::Path;

use crate::artifact::BuildArtifact;
use crate::error::Result;

/// Builds a project directory and reports what it compiled.
///
/// Called on the blocking thread pool. May be slow and must be safe to call
/// repeatedly.
pub trait BuildInvoker: Send + Sync + 'static {
    fn build(&self, project_dir: &Path) -> Result<BuildArtifact>;
}

impl<F> BuildInvoker for F
where
    F: Fn(&Path) -> Result<BuildArtifact> + Send + Sync + 'static,
{
    fn build(&self, project_dir: &Path) -> Result<BuildArtifact> {
        self(project_dir)
    }
}
