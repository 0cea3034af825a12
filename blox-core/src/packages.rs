//! Block-package documents.
//!
//! A page (and the layout) may declare global blocks it wants connected
//! through a YAML document next to its template:
//!
//! ```yaml
//! partialPackages:
//!   - name: chrome
//!     blocks: [blox.partial.header, blox.partial.footer]
//! componentPackages:
//!   - name: widgets
//!     blocks:
//!       - name: blox.component.carousel
//! ```
//!
//! Missing files, unparseable YAML and keys of the wrong shape all degrade to
//! an empty contribution.

use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;
use std::path::Path;
use tracing::debug;

use crate::fs::TemplateFs;

const PARTIAL_PACKAGES_KEY: &str = "partialPackages";
const COMPONENT_PACKAGES_KEY: &str = "componentPackages";
const APP_KEY: &str = "app";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlockPackage {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<PackageBlock>,
}

/// A block listed by a package, either as a bare name or as `{ name: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PackageBlock {
    Name(String),
    Named { name: String },
}

impl PackageBlock {
    pub fn name(&self) -> &str {
        match self {
            PackageBlock::Name(name) | PackageBlock::Named { name } => name,
        }
    }
}

/// The packages declared by one block-package file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDocument {
    pub partial_packages: Vec<BlockPackage>,
    pub component_packages: Vec<BlockPackage>,
}

impl PackageDocument {
    /// Parse a (possibly multi-document) YAML file. Documents contribute in
    /// the order they appear.
    pub fn parse(text: &str) -> Self {
        let mut document = Self::default();

        for doc in serde_yaml::Deserializer::from_str(text) {
            let Ok(value) = YamlValue::deserialize(doc) else {
                break;
            };
            document
                .partial_packages
                .extend(packages_under(&value, PARTIAL_PACKAGES_KEY));
            document
                .component_packages
                .extend(packages_under(&value, COMPONENT_PACKAGES_KEY));
        }

        document
    }

    pub fn read(fs: &dyn TemplateFs, path: &Path) -> Self {
        match fs.read_text(path) {
            Some(text) => Self::parse(&text),
            None => Self::default(),
        }
    }
}

fn packages_under(doc: &YamlValue, key: &str) -> Vec<BlockPackage> {
    match doc.get(key) {
        Some(value @ YamlValue::Sequence(_)) => {
            serde_yaml::from_value(value.clone()).unwrap_or_else(|err| {
                debug!(key, %err, "ignoring malformed block packages");
                Vec::new()
            })
        }
        _ => Vec::new(),
    }
}

/// The resolved set of global block packages for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectConfig {
    pub partial_packages: Vec<BlockPackage>,
    pub component_packages: Vec<BlockPackage>,
    pub page_name: String,
    pub page_full_name: String,
}

impl ConnectConfig {
    /// Page packages always come before the layout's.
    pub fn merge(
        page: PackageDocument,
        layout: PackageDocument,
        page_name: &str,
        page_full_name: &str,
    ) -> Self {
        let mut partial_packages = page.partial_packages;
        partial_packages.extend(layout.partial_packages);
        let mut component_packages = page.component_packages;
        component_packages.extend(layout.component_packages);

        Self {
            partial_packages,
            component_packages,
            page_name: page_name.to_string(),
            page_full_name: page_full_name.to_string(),
        }
    }

    pub fn resolve(
        fs: &dyn TemplateFs,
        page_doc: &Path,
        layout_doc: &Path,
        page_name: &str,
        page_full_name: &str,
    ) -> Self {
        Self::merge(
            PackageDocument::read(fs, page_doc),
            PackageDocument::read(fs, layout_doc),
            page_name,
            page_full_name,
        )
    }
}

/// Global metadata from the first document carrying an `app` mapping.
pub fn read_app_data(fs: &dyn TemplateFs, path: &Path) -> serde_json::Value {
    let empty = || serde_json::Value::Object(serde_json::Map::new());
    let Some(text) = fs.read_text(path) else {
        return empty();
    };

    for doc in serde_yaml::Deserializer::from_str(&text) {
        let Ok(value) = YamlValue::deserialize(doc) else {
            break;
        };
        if let Some(app @ YamlValue::Mapping(_)) = value.get(APP_KEY) {
            return serde_json::to_value(app).unwrap_or_else(|_| empty());
        }
    }

    empty()
}
