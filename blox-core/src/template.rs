use std::path::{Path, PathBuf};
use tera::{Context, Tera};

use crate::page::{PageBuilder, PageUnit};

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Renders page units with Tera. Templates are named by their path relative
/// to the templates root and receive the unit context as `blox`.
pub struct TeraPageBuilder {
    tera: Tera,
    output_dir: PathBuf,
}

impl TeraPageBuilder {
    pub fn new(
        templates_root: &Path,
        template_extension: &str,
        output_dir: &Path,
    ) -> Result<Self, TemplateError> {
        let glob = format!("{}/**/*.{template_extension}", templates_root.display());
        let tera = Tera::new(&glob)?;

        Ok(Self {
            tera,
            output_dir: output_dir.to_path_buf(),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render a page unit to a string
    pub fn render(&self, unit: &PageUnit) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("blox", &unit.context);
        Ok(self.tera.render(&unit.template, &context)?)
    }

    /// Render a page unit and write it below the output directory
    pub fn render_to_file(&self, unit: &PageUnit) -> Result<PathBuf, TemplateError> {
        let rendered = self.render(unit)?;
        let output_path = self.output_dir.join(&unit.output);

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&output_path, rendered)?;
        Ok(output_path)
    }
}

impl PageBuilder for TeraPageBuilder {
    fn build_page(&mut self, unit: PageUnit) -> Result<(), TemplateError> {
        self.render_to_file(&unit)?;
        Ok(())
    }
}
