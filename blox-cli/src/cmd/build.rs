use anyhow::Result;
use blox_core::{Blox, BuildPlan, PageBuilder, PageUnit, SnapshotLoader, TeraPageBuilder};
use clap::{ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing::info;

use super::add_project_args;
use crate::config::BloxConfig;

/// Entry map handed to the bundler, relative to the project root.
pub const ENTRY_FILE: &str = "blox-entry.json";

pub fn make_subcommand() -> Command {
    add_project_args(Command::new("build"))
        .about("Resolve blocks, write generated styles and the entry map, and render every page")
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = BloxConfig::load(args)?;
    let output_dir = PathBuf::from(&config.build.out);

    let pages = build_site(&config).await?;

    println!("Built {pages} pages in {}", output_dir.display());

    Ok(())
}

/// Load content and compose every page without writing anything.
pub async fn compose(config: &BloxConfig) -> Result<(Blox, BuildPlan, Vec<PageUnit>)> {
    let root = Path::new(&config.build.root);

    // Content must be in place before any page is composed
    let loader = SnapshotLoader::new(root, config.project.remote.clone());
    let snapshot = loader.load(config.build.mode).await?;

    let blox = Blox::builder()
        .project_root(root)
        .config(&config.project)?
        .build();

    let mut units = Vec::new();
    let plan = blox.run(&snapshot, &mut units)?;

    Ok((blox, plan, units))
}

/// Compose the project, write generated files and render pages.
/// Returns the number of rendered pages.
pub async fn build_site(config: &BloxConfig) -> Result<usize> {
    let (blox, plan, units) = compose(config).await?;

    plan.write(blox.filesystem(), blox.project_root())?;
    let entry_file = blox.project_root().join(ENTRY_FILE);
    std::fs::write(&entry_file, serde_json::to_string_pretty(&plan.entry)?)?;
    info!(path = %entry_file.display(), entries = plan.entry.len(), "wrote entry map");

    let output_dir = PathBuf::from(&config.build.out);
    let mut renderer =
        TeraPageBuilder::new(blox.templates_root(), blox.template_extension(), &output_dir)?;
    let count = units.len();
    for unit in units {
        renderer.build_page(unit)?;
    }

    Ok(count)
}
