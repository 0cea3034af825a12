pub mod build;
pub mod plan;
pub mod watch;

use clap::{Arg, Command};

/// Arguments shared by every command that composes a project.
pub fn add_project_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .help("Project root containing src/templates [default: .]"),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("DIR")
                .help("Output directory for rendered pages [default: ./dist]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./blox.toml]"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .value_parser(["development", "production"])
                .help("production refreshes content from the remote endpoint"),
        )
}
