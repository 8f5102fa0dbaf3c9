//! Watch command implementation for Kestrel CLI.
//!
//! Builds the project, then rebuilds each time a file change invalidates
//! the build. After a failed build, the next change to a project or code
//! file triggers the retry.

use std::path::Path;
use std::time::Duration;

use kestrel_core::{ChangeEvent, ProjectWatcher};
use kestrel_kernel::{CommandId, EventBus, KernelEvent, ProjectPackage};
use tokio::sync::{broadcast, mpsc};

use crate::colors;
use crate::project::{self, BuildOptions};

/// Quiet period after a failed build before pending file events are dropped.
const FAILURE_SETTLE: Duration = Duration::from_millis(200);

/// Execute the watch command.
pub async fn execute(dir: &Path, options: &BuildOptions) -> anyhow::Result<()> {
    let bus = EventBus::new();
    let mut events = bus.subscribe();
    let package = project::open(dir, options, true, &bus)?;

    println!(
        "\n{}Kestrel Watch{} - {}{}{}",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        package.project_dir().display(),
        colors::RESET
    );
    println!("{}", "─".repeat(50));
    println!(
        "{}Watching for changes... (Ctrl+C to stop){}",
        colors::DIM,
        colors::RESET
    );

    // Raw changes, used to wait for a fix after a failed build.
    let mut changes = match ProjectWatcher::new(package.project_dir()) {
        Ok((watcher, rx)) => Some((watcher, rx)),
        Err(e) => {
            eprintln!(
                "{}Warning:{} {}; changes will not trigger rebuilds",
                colors::YELLOW,
                colors::RESET,
                e
            );
            None
        }
    };

    let mut healthy = rebuild(&package, &mut changes).await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}Stopped{}", colors::DIM, colors::RESET);
                break;
            }
            event = events.recv() => match event {
                Ok(event @ KernelEvent::ProjectInvalidated { .. }) => {
                    report(&event);
                    if healthy {
                        drain_bus(&mut events);
                        healthy = rebuild(&package, &mut changes).await;
                    }
                }
                Ok(event) => report(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Skipped {} kernel events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            change = next_change(&mut changes) => {
                if !healthy && change.classification().is_source() {
                    println!(
                        "\n{}File {}{}: {}",
                        colors::YELLOW,
                        change.label(),
                        colors::RESET,
                        change.path().display()
                    );
                    drain_bus(&mut events);
                    healthy = rebuild(&package, &mut changes).await;
                }
            }
        }
    }

    Ok(())
}

/// Build once and report the outcome. Returns whether the build succeeded.
///
/// File events that arrive while building, or while a failure settles, are
/// dropped so the build's own writes cannot trigger a retry.
async fn rebuild(
    package: &ProjectPackage,
    changes: &mut Option<(ProjectWatcher, mpsc::UnboundedReceiver<ChangeEvent>)>,
) -> bool {
    let ok = match package.ensure_ready(&CommandId::new()).await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Rebuild failed: {}", e);
            tokio::time::sleep(FAILURE_SETTLE).await;
            false
        }
    };

    if let Some((_, rx)) = changes {
        while rx.try_recv().is_ok() {}
    }
    colors::flush_stdout();
    ok
}

/// Next raw file change. Pends forever when watching is unavailable.
async fn next_change(
    changes: &mut Option<(ProjectWatcher, mpsc::UnboundedReceiver<ChangeEvent>)>,
) -> ChangeEvent {
    match changes {
        Some((_, rx)) => match rx.recv().await {
            Some(change) => change,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

/// Report queued bus events without acting on them.
fn drain_bus(events: &mut broadcast::Receiver<KernelEvent>) {
    while let Ok(event) = events.try_recv() {
        report(&event);
    }
}

fn report(event: &KernelEvent) {
    match event {
        KernelEvent::ProjectBuilt {
            project_name,
            documents,
            ..
        } => {
            println!(
                "{}Built{} {} ({} documents)",
                colors::GREEN,
                colors::RESET,
                project_name,
                documents.len()
            );
        }
        KernelEvent::ProjectBuildFailed { message, .. } => {
            eprintln!("{}Error:{} {}", colors::RED, colors::RESET, message);
            println!(
                "{}Waiting for a project or code file to change...{}",
                colors::DIM,
                colors::RESET
            );
        }
        KernelEvent::ProjectInvalidated { change, path, .. } => {
            println!(
                "\n{}File {}{}: {}",
                colors::YELLOW,
                change,
                colors::RESET,
                path
            );
        }
        KernelEvent::DisplayedValueProduced { .. } | KernelEvent::DisplayedValueUpdated { .. } => {}
    }
}
