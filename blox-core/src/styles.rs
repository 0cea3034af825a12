//! Per-page block connection state: the generated Sass text, pending image
//! requires and the page's script flag.

use std::path::PathBuf;

use crate::plan::GeneratedStyle;

/// Every generated stylesheet starts with the global and layout styles.
pub const STYLE_SEED: &str = "@import \"../main\";\n@import \"../../../templates/layout/layout\";\n";

/// Directory of generated stylesheets, relative to the project root.
pub const GENERATED_STYLES_DIR: &str = "src/assets/scss/generated";

#[derive(Debug, Clone)]
pub struct BlockConnection {
    name: String,
    style: String,
    pending_images: String,
    pub has_scripts: bool,
}

impl BlockConnection {
    pub fn new(name: &str, has_scripts: bool) -> Self {
        Self {
            name: name.to_string(),
            style: STYLE_SEED.to_string(),
            pending_images: String::new(),
            has_scripts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    /// Append an import of `module` (template-relative, without extension).
    pub fn import_style(&mut self, label: &str, module: &str) {
        self.style.push_str(&format!(
            "\n\n/************\nAuto-generated Sass for {label}\n*************/\n@import \"../../../templates/{module}\";"
        ));
    }

    /// Queue a `require` for an image (template-relative path).
    pub fn require_image(&mut self, image: &str) {
        self.pending_images
            .push_str(&format!("require(\"../../../templates/{image}\");\n"));
    }

    pub fn take_pending_images(&mut self) -> String {
        std::mem::take(&mut self.pending_images)
    }

    pub fn finish(self) -> GeneratedStyle {
        GeneratedStyle {
            path: PathBuf::from(GENERATED_STYLES_DIR).join(format!("{}.scss", self.name)),
            name: self.name,
            contents: self.style,
        }
    }
}
