use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::data::RemoteConfig;
use crate::entry::DEFAULT_ENTRY_PATH;

pub const DEFAULT_ITEMS_PER_PAGE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("items_per_page must be at least 1")]
    ZeroItemsPerPage,
}

/// Project configuration. The CLI loads it from `blox.toml` layered under
/// `BLOX_*` environment variables.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Modules every entry starts with
    pub entry_paths: Vec<String>,
    /// Items per listing page of a master/detail collection
    pub items_per_page: usize,
    /// Extension of page templates
    pub template_extension: String,
    /// Extra top-level context handed to every page
    pub data: serde_json::Map<String, serde_json::Value>,
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_paths: vec![DEFAULT_ENTRY_PATH.to_string()],
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            template_extension: "njk".to_string(),
            data: serde_json::Map::new(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Config {
    pub fn items_per_page(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.items_per_page).ok_or(ConfigError::ZeroItemsPerPage)
    }
}
