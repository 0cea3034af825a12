use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::entry::EntryMap;
use crate::fs::TemplateFs;

/// Consolidated image requires, relative to the project root.
pub const IMAGES_SCRIPT_PATH: &str = "src/assets/js/generated/images.js";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedStyle {
    pub name: String,
    /// Relative to the project root.
    pub path: PathBuf,
    pub contents: String,
}

/// Everything a run produces besides the page units: the bundler entry map,
/// one stylesheet per logical page and the image requires script.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildPlan {
    pub entry: EntryMap,
    pub styles: Vec<GeneratedStyle>,
    pub images: String,
}

impl BuildPlan {
    pub fn new(entry: EntryMap) -> Self {
        Self {
            entry,
            styles: Vec::new(),
            images: String::new(),
        }
    }

    pub fn style(&self, name: &str) -> Option<&GeneratedStyle> {
        self.styles.iter().find(|style| style.name == name)
    }

    /// Write every generated file under `root`, replacing previous output.
    pub fn write(&self, fs: &dyn TemplateFs, root: &Path) -> io::Result<()> {
        for style in &self.styles {
            fs.write_text(&root.join(&style.path), &style.contents)?;
        }
        fs.write_text(&root.join(IMAGES_SCRIPT_PATH), &self.images)
    }
}
