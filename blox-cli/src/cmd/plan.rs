use anyhow::Result;
use clap::{ArgMatches, Command};
use serde_json::json;

use super::add_project_args;
use super::build::compose;
use crate::config::BloxConfig;

pub fn make_subcommand() -> Command {
    add_project_args(Command::new("plan"))
        .about("Print the entry map, generated styles and page units as JSON without writing")
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let config = BloxConfig::load(args)?;
    let (_, plan, units) = compose(&config).await?;

    let styles: Vec<_> = plan
        .styles
        .iter()
        .map(|style| json!({ "name": style.name, "path": style.path }))
        .collect();
    let report = json!({
        "entry": plan.entry,
        "styles": styles,
        "images": plan.images,
        "pages": units,
    });

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
