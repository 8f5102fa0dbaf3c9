//! Build by running an external tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::artifact::BuildArtifact;
use crate::build::BuildInvoker;
use crate::error::{Error, Result};
use crate::paths::ProjectDirs;

/// Number of output lines kept in a build failure message.
const FAILURE_TAIL_LINES: usize = 20;

/// The external command used to build a project.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    /// Program name or path, resolved through `PATH`.
    pub program: String,

    /// Arguments passed before the build log argument.
    pub args: Vec<String>,

    /// Write a binary build log here (`-bl:<path>`). `None` disables it.
    pub build_log: Option<PathBuf>,
}

impl Default for BuildCommand {
    fn default() -> Self {
        Self {
            program: "dotnet".to_string(),
            args: vec!["build".to_string(), "-nologo".to_string()],
            build_log: None,
        }
    }
}

impl BuildCommand {
    /// `dotnet build` writing its binary log into the project's state directory.
    pub fn dotnet(dirs: &ProjectDirs) -> Self {
        Self {
            build_log: Some(dirs.build_log_path()),
            ..Self::default()
        }
    }

    /// An arbitrary program with arguments and no build log.
    pub fn custom<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            build_log: None,
        }
    }

    /// Full argument list, including the build log argument.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = self.args.clone();
        if let Some(log) = &self.build_log {
            args.push(format!("-bl:{}", log.display()));
        }
        args
    }
}

/// [`BuildInvoker`] that runs a [`BuildCommand`] in the project directory.
///
/// On success the artifact records the project and code files found under
/// the project directory once the tool has exited.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    command: BuildCommand,
}

impl CommandBuilder {
    pub fn new(command: BuildCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &BuildCommand {
        &self.command
    }

    /// Find the program in `PATH`.
    fn resolve_program(&self) -> Result<PathBuf> {
        which::which(&self.command.program)
            .map_err(|_| Error::ToolNotFound(self.command.program.clone()))
    }
}

impl BuildInvoker for CommandBuilder {
    fn build(&self, project_dir: &Path) -> Result<BuildArtifact> {
        let program = self.resolve_program()?;

        if let Some(parent) = self.command.build_log.as_ref().and_then(|p| p.parent()) {
            fs::create_dir_all(parent)?;
        }

        let args = self.command.arguments();
        tracing::info!(
            "Building {}: {} {}",
            project_dir.display(),
            self.command.program,
            args.join(" ")
        );

        let start = Instant::now();
        let output = Command::new(&program)
            .args(&args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::Build {
                project: project_dir.to_path_buf(),
                message: format!("failed to run {}: {}", self.command.program, e),
            })?;
        let duration = start.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(Error::Build {
                project: project_dir.to_path_buf(),
                message: failure_message(&output.status.to_string(), &stdout, &stderr),
            });
        }

        let mut artifact = BuildArtifact::scan(project_dir)?;
        artifact.output = stdout;
        artifact.duration = duration;
        artifact.build_log = self.command.build_log.clone().filter(|p| p.exists());

        tracing::info!(
            "Built {} in {:.2}s ({} documents)",
            project_dir.display(),
            duration.as_secs_f64(),
            artifact.documents.len()
        );

        Ok(artifact)
    }
}

/// Exit status plus the last lines of stderr, or of stdout when stderr is empty.
fn failure_message(status: &str, stdout: &str, stderr: &str) -> String {
    let source = if stderr.trim().is_empty() { stdout } else { stderr };
    let lines: Vec<&str> = source.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail = &lines[lines.len().saturating_sub(FAILURE_TAIL_LINES)..];

    if tail.is_empty() {
        status.to_string()
    } else {
        format!("{}\n{}", status, tail.join("\n"))
    }
}
