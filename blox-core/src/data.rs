//! Content snapshot: the JSON database pages draw their collections from.
//!
//! In production mode the snapshot is refreshed from a remote export
//! endpoint before any page is composed; otherwise (or when the fetch fails)
//! the last persisted `src/data/db.json` is used.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Persisted snapshot location, relative to the project root.
pub const SNAPSHOT_PATH: &str = "src/data/db.json";

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Please provide \"{0}\" to fetch remote content")]
    MissingCredential(&'static str),
    #[error("remote fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Fail the run instead of falling back to the persisted snapshot.
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Value);

impl Default for Snapshot {
    fn default() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }
}

impl Snapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> Result<Self, DataError> {
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Items of the collection attached to page `name`, if any.
    pub fn collection(&self, name: &str) -> Option<&[Value]> {
        self.0
            .get(name)?
            .get("items")?
            .as_array()
            .map(Vec::as_slice)
    }

    pub fn plural_name(&self, name: &str) -> Option<&str> {
        self.0.get(name)?.get("contentType")?.get("pluralName")?.as_str()
    }
}

pub struct SnapshotLoader {
    snapshot_path: PathBuf,
    remote: RemoteConfig,
    client: reqwest::Client,
}

impl SnapshotLoader {
    pub fn new(project_root: &Path, remote: RemoteConfig) -> Self {
        Self {
            snapshot_path: project_root.join(SNAPSHOT_PATH),
            remote,
            client: reqwest::Client::new(),
        }
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub async fn load(&self, mode: Mode) -> Result<Snapshot, DataError> {
        if mode == Mode::Production {
            let endpoint = self
                .remote
                .endpoint
                .as_deref()
                .ok_or(DataError::MissingCredential("endpoint"))?;
            let api_key = self
                .remote
                .api_key
                .as_deref()
                .ok_or(DataError::MissingCredential("api_key"))?;

            match self.refresh(endpoint, api_key).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(err) if self.remote.strict => return Err(err),
                Err(err) => {
                    warn!(%err, "could not refresh content, using persisted snapshot");
                }
            }
        }

        self.load_persisted()
    }

    /// Fetch the remote export and persist it as the new snapshot.
    async fn refresh(&self, endpoint: &str, api_key: &str) -> Result<Snapshot, DataError> {
        info!(endpoint, "fetching content");
        let value: Value = self
            .client
            .get(endpoint)
            .query(&[("apikey", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(parent) = self.snapshot_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.snapshot_path, serde_json::to_string_pretty(&value)?)?;

        Ok(Snapshot(value))
    }

    /// The persisted snapshot; an absent file is an empty database.
    pub fn load_persisted(&self) -> Result<Snapshot, DataError> {
        if !self.snapshot_path.exists() {
            return Ok(Snapshot::default());
        }
        let text = std::fs::read_to_string(&self.snapshot_path)?;
        Snapshot::parse(&text)
    }
}
