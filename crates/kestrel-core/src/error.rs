//! Error types for kestrel-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for kestrel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kestrel-core.
#[derive(Debug, Error)]
pub enum Error {
    /// The external build tool ran and reported failure.
    #[error("build failed for {}: {message}", project.display())]
    Build { project: PathBuf, message: String },

    /// The external build tool could not be located.
    #[error("build tool not found: {0}")]
    ToolNotFound(String),

    /// The build did not finish within the configured deadline.
    #[error("build of {} timed out after {}s", project.display(), timeout.as_secs())]
    BuildTimeout { project: PathBuf, timeout: Duration },

    /// Every build attempt was invalidated by file changes before it finished.
    #[error("build result superseded by file changes {attempts} times in a row")]
    Superseded { attempts: u32 },

    /// The filesystem watcher could not be armed.
    #[error("file watch error: {0}")]
    Watch(String),

    /// Artifact snapshot could not be read or written.
    #[error("artifact store error: {0}")]
    Store(String),

    /// The project directory is missing or not a directory.
    #[error("not a project directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for errors raised by the build step itself.
    ///
    /// These are the errors a caller of `ensure_built` is expected to report.
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            Error::Build { .. }
                | Error::ToolNotFound(_)
                | Error::BuildTimeout { .. }
                | Error::Superseded { .. }
        )
    }

    /// Render the error with a short recovery hint for terminal output.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::Build { .. } => Some("fix the reported errors; the next request rebuilds"),
            Error::ToolNotFound(_) => Some("install the build tool or pass --tool"),
            Error::BuildTimeout { .. } => Some("raise --timeout or check for a hung build"),
            Error::Superseded { .. } => Some("files are still changing; retry once edits settle"),
            Error::NotADirectory(_) => Some("pass the directory containing the project file"),
            _ => None,
        };

        match hint {
            Some(hint) => format!("{self}\n  hint: {hint}"),
            None => self.to_string(),
        }
    }
}

/// Duplicates an error for callers sharing one failed build.
/// IO errors keep their kind and message.
impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Error::Build { project, message } => Error::Build {
                project: project.clone(),
                message: message.clone(),
            },
            Error::ToolNotFound(tool) => Error::ToolNotFound(tool.clone()),
            Error::BuildTimeout { project, timeout } => Error::BuildTimeout {
                project: project.clone(),
                timeout: *timeout,
            },
            Error::Superseded { attempts } => Error::Superseded {
                attempts: *attempts,
            },
            Error::Watch(message) => Error::Watch(message.clone()),
            Error::Store(message) => Error::Store(message.clone()),
            Error::NotADirectory(path) => Error::NotADirectory(path.clone()),
            Error::Io(e) => Error::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}
