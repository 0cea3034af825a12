use anyhow::Result;
use blox_core::walker::TEMPLATES_DIR;
use clap::{ArgMatches, Command};
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{path::PathBuf, time::Duration};
use tracing::{error, info};

use super::add_project_args;
use super::build::build_site;
use crate::config::BloxConfig;

pub fn make_subcommand() -> Command {
    add_project_args(Command::new("watch"))
        .about("Build, then rebuild whenever templates or the config file change")
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = BloxConfig::load(args)?;
    rebuild(args).await;

    let templates_dir = PathBuf::from(&config.build.root).join(TEMPLATES_DIR);
    let config_file = PathBuf::from(&config.build.config);

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    // Watch templates directory
    debouncer
        .watcher()
        .watch(&templates_dir, RecursiveMode::Recursive)?;
    info!(dir = %templates_dir.display(), "watching templates");

    // Watch config file if it exists
    if config_file.exists() {
        debouncer
            .watcher()
            .watch(&config_file, RecursiveMode::NonRecursive)?;
        info!(file = %config_file.display(), "watching config file");
    }

    while let Some(path) = rx.recv().await {
        // One rebuild per debounced batch
        while rx.try_recv().is_ok() {}
        info!(path = %path.display(), "change detected");
        rebuild(args).await;
    }

    Ok(())
}

/// Rebuild with freshly loaded configuration; failures are reported and
/// the watch keeps going.
async fn rebuild(args: &ArgMatches) {
    let result = match BloxConfig::load(args) {
        Ok(config) => build_site(&config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(pages) => println!("Site rebuilt successfully ({pages} pages)"),
        Err(err) => error!("Build error: {err:#}"),
    }
}
