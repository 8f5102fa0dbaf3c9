//! Kestrel CLI - build and watch project packages for the notebook kernel.

mod build;
mod check;
mod colors;
mod project;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::project::BuildOptions;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(about = "Cached builds for notebook project packages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a project once and list its documents
    Build {
        /// Project directory
        dir: PathBuf,

        #[command(flatten)]
        options: BuildOptions,
    },

    /// Report whether the recorded build still matches the files on disk
    Check {
        /// Project directory
        dir: PathBuf,
    },

    /// Build, then rebuild whenever project files change
    Watch {
        /// Project directory
        dir: PathBuf,

        #[command(flatten)]
        options: BuildOptions,
    },

    /// Remove the recorded build and build logs
    Clean {
        /// Project directory
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Attach recovery hints to library errors.
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(core_err) = err.downcast_ref::<kestrel_core::Error>() {
            anyhow::anyhow!("{}", core_err.with_hint())
        } else if let Some(kernel_err) = err.downcast_ref::<kestrel_kernel::KernelError>() {
            anyhow::anyhow!("{}", kernel_err.with_hint())
        } else {
            err
        }
    };

    match cli.command {
        Commands::Build { dir, options } => {
            build::execute(&dir, &options).await.map_err(format_error)?;
        }

        Commands::Check { dir } => {
            let fresh = check::execute(&dir).map_err(format_error)?;
            if !fresh {
                std::process::exit(1);
            }
        }

        Commands::Watch { dir, options } => {
            watch::execute(&dir, &options).await.map_err(format_error)?;
        }

        Commands::Clean { dir } => {
            let dirs = kestrel_core::ProjectDirs::locate(&dir).map_err(|e| format_error(e.into()))?;
            dirs.clean().map_err(|e| format_error(e.into()))?;
            println!("Removed {}", dirs.state_dir.display());
        }
    }

    Ok(())
}
