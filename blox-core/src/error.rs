use std::path::PathBuf;

use crate::naming::NamingError;
use crate::pagination::SlugError;
use crate::template::TemplateError;

/// Fatal errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("pages directory not found: {}", .0.display())]
    MissingPagesDir(PathBuf),
    #[error("page `{name}` is defined by both `{first}` and `{second}`")]
    DuplicatePage {
        name: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("page builder failed: {0}")]
    PageBuilder(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
