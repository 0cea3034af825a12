//! Bundler entry map.
//!
//! One ordered module list per logical page name. Entries keep their
//! insertion order and are never re-sorted; scripts are appended in the
//! order they are discovered.

use serde::ser::{Serialize, SerializeMap, Serializer};

pub const DEFAULT_ENTRY_PATH: &str = "./src/assets/js/main.js";

/// Generated per-page stylesheet module for `name`.
pub fn style_module_path(name: &str) -> String {
    format!("./src/assets/scss/generated/{name}.scss")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMap {
    default_paths: Vec<String>,
    entries: Vec<(String, Vec<String>)>,
}

impl Default for EntryMap {
    fn default() -> Self {
        Self::new(vec![DEFAULT_ENTRY_PATH.to_string()])
    }
}

impl EntryMap {
    pub fn new(default_paths: Vec<String>) -> Self {
        Self {
            default_paths,
            entries: Vec::new(),
        }
    }

    /// Seed `name` with the default paths and its generated style module.
    /// Creating an existing entry starts it over in place.
    pub fn create_entry(&mut self, name: &str) {
        let mut modules = self.default_paths.clone();
        modules.push(style_module_path(name));

        match self.position(name) {
            Some(index) => self.entries[index].1 = modules,
            None => self.entries.push((name.to_string(), modules)),
        }
    }

    /// Append a script module to `name`, creating the entry first if needed.
    /// Duplicates are kept.
    pub fn append_script(&mut self, name: &str, module: impl Into<String>) {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.create_entry(name);
                self.entries.len() - 1
            }
        };
        self.entries[index].1.push(module.into());
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|index| self.entries[index].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, modules)| (name.as_str(), modules.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry == name)
    }
}

impl Serialize for EntryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, modules) in &self.entries {
            map.serialize_entry(name, modules)?;
        }
        map.end()
    }
}
