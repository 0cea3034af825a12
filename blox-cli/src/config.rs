use anyhow::Result;
use blox_core::Mode;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "blox.toml";
pub const DEFAULT_CONFIG_FILE: &str = "./blox.toml";

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BloxConfig {
    /// Build configuration
    pub build: BuildConfig,
    /// Project configuration (from blox-core)
    #[serde(flatten)]
    pub project: blox_core::config::Config,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Project root containing `src/templates`
    pub root: String,
    /// Output directory for rendered pages
    pub out: String,
    /// Configuration file path
    pub config: String,
    /// Development reads the persisted snapshot, production refreshes it
    pub mode: Mode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            out: "./dist".to_string(),
            config: DEFAULT_CONFIG_FILE.to_string(),
            mode: Mode::Development,
        }
    }
}

/// Read an optional string argument, tolerating commands that don't define it.
fn arg<'a>(args: &'a ArgMatches, id: &str) -> Option<&'a String> {
    args.try_get_one::<String>(id).ok().flatten()
}

impl BloxConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (BLOX_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        // Without --config, blox.toml is looked up in the project root
        let config_file = match arg(args, "config") {
            Some(file) => file.clone(),
            None => {
                let root = arg(args, "root")
                    .cloned()
                    .or_else(|| std::env::var("BLOX_BUILD__ROOT").ok())
                    .unwrap_or_else(|| ".".to_string());
                Path::new(&root)
                    .join(CONFIG_FILE_NAME)
                    .to_string_lossy()
                    .into_owned()
            }
        };

        let defaults = Self::default();
        let mut builder = ConfigBuilder::builder()
            .add_source(ConfigBuilder::try_from(&defaults)?)
            .add_source(File::from(Path::new(&config_file)).required(false))
            .add_source(
                Environment::with_prefix("BLOX")
                    .prefix_separator("_")
                    .separator("__") // Use double underscore for nested keys
                    .try_parsing(true),
            );

        for key in ["root", "out", "mode"] {
            if let Some(value) = arg(args, key) {
                builder = builder.set_override(format!("build.{key}"), value.as_str())?;
            }
        }
        builder = builder.set_override("build.config", config_file.as_str())?;

        let blox_config: BloxConfig = builder.build()?.try_deserialize()?;
        Ok(blox_config)
    }
}
