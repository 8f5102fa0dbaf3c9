//! Build command implementation for Kestrel CLI.

use std::path::Path;
use std::time::Instant;

use kestrel_kernel::{CommandId, EventBus};

use crate::colors;
use crate::project::{self, BuildOptions};

/// Build the project once and print its documents.
pub async fn execute(dir: &Path, options: &BuildOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let bus = EventBus::new();
    let package = project::open(dir, options, false, &bus)?;

    println!(
        "\n{}Building{} {}",
        colors::BOLD,
        colors::RESET,
        package.project_dir().display()
    );
    let workspace = package.ensure_ready(&CommandId::new()).await?;

    println!("{}", "─".repeat(50));
    for document in workspace.documents() {
        println!("  {}", document.path.display());
    }
    println!("{}", "─".repeat(50));
    println!(
        "{}Ready{} {} ({} documents) in {:.2}s",
        colors::GREEN,
        colors::RESET,
        workspace.project_name(),
        workspace.document_count(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}
