//! Opening a project package from command-line options.

use std::path::Path;
use std::time::Duration;

use clap::Args;
use kestrel_core::{BuildCache, BuildCommand, CacheConfig, CommandBuilder, ProjectDirs};
use kestrel_kernel::{EventBus, ProjectPackage};

/// Options shared by commands that build.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildOptions {
    /// Give up on a build after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not write a binary build log
    #[arg(long)]
    pub no_binlog: bool,

    /// Build with this program instead of `dotnet build`
    #[arg(long, value_name = "PROG")]
    pub tool: Option<String>,

    /// Argument passed to --tool (repeatable)
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true, requires = "tool")]
    pub tool_args: Vec<String>,
}

impl BuildOptions {
    fn command(&self, dirs: &ProjectDirs) -> BuildCommand {
        let mut command = match &self.tool {
            Some(tool) => BuildCommand::custom(tool.clone(), self.tool_args.iter().cloned()),
            None => BuildCommand::dotnet(dirs),
        };
        if self.no_binlog {
            command.build_log = None;
        }
        command
    }

    fn config(&self, dirs: &ProjectDirs, watch: bool) -> CacheConfig {
        let mut config = CacheConfig::for_project(dirs);
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if !watch {
            config = config.without_watch();
        }
        config
    }
}

/// Open `dir` as a project package publishing to `bus`.
pub fn open(dir: &Path, options: &BuildOptions, watch: bool, bus: &EventBus) -> anyhow::Result<ProjectPackage> {
    let dirs = ProjectDirs::create(dir)?;
    let command = options.command(&dirs);
    tracing::debug!("Build command: {} {}", command.program, command.arguments().join(" "));

    let cache = BuildCache::new(
        &dirs.project_dir,
        CommandBuilder::new(command),
        options.config(&dirs, watch),
    )?;
    Ok(ProjectPackage::with_cache(cache, bus.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_command_writes_binlog() {
        let temp = TempDir::new().unwrap();
        let dirs = ProjectDirs::locate(temp.path()).unwrap();

        let command = BuildOptions::default().command(&dirs);
        assert_eq!(command.program, "dotnet");
        assert!(command.arguments().last().unwrap().starts_with("-bl:"));
    }

    #[test]
    fn test_no_binlog_and_custom_tool() {
        let temp = TempDir::new().unwrap();
        let dirs = ProjectDirs::locate(temp.path()).unwrap();

        let options = BuildOptions {
            no_binlog: true,
            ..BuildOptions::default()
        };
        assert!(options.command(&dirs).build_log.is_none());

        let options = BuildOptions {
            tool: Some("make".to_string()),
            tool_args: vec!["all".to_string()],
            ..BuildOptions::default()
        };
        assert_eq!(options.command(&dirs).arguments(), vec!["all"]);
    }

    #[test]
    fn test_config_from_options() {
        let temp = TempDir::new().unwrap();
        let dirs = ProjectDirs::locate(temp.path()).unwrap();
        let options = BuildOptions {
            timeout: Some(30),
            ..BuildOptions::default()
        };

        let config = options.config(&dirs, false);
        assert_eq!(config.build_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.artifact_path, Some(dirs.artifact_path()));
        assert!(!config.watch);
    }
}
