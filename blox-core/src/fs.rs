//! Filesystem queries used while walking the template tree.
//!
//! Probes are best-effort: an absent or unreadable directory comes back as
//! `None` (or `false`) and never as an error.

use regex::Regex;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

pub static SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.js$").expect("valid script pattern"));
pub static STYLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(sa|sc|c)ss$").expect("valid style pattern"));
pub static IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|svg|webp)$").expect("valid image pattern"));

pub trait TemplateFs {
    /// Names of the subdirectories of `path`, in listing order.
    fn subdirectories(&self, path: &Path) -> Option<Vec<String>>;

    /// Names of the regular files directly inside `path`, in listing order.
    fn files(&self, path: &Path) -> Option<Vec<String>>;

    fn read_text(&self, path: &Path) -> Option<String>;

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()>;

    /// Whether any file directly inside `path` matches `pattern`.
    fn contains_match(&self, path: &Path, pattern: &Regex) -> bool {
        self.files(path)
            .is_some_and(|files| files.iter().any(|file| pattern.is_match(file)))
    }
}

/// The real filesystem. Listings are sorted by file name so runs are
/// reproducible across platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFs;

impl DiskFs {
    fn entries(path: &Path, dirs: bool) -> Option<Vec<String>> {
        if !path.is_dir() {
            return None;
        }

        // An unreadable entry is skipped, not fatal to the listing
        let names = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir() == dirs)
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();

        Some(names)
    }
}

impl TemplateFs for DiskFs {
    fn subdirectories(&self, path: &Path) -> Option<Vec<String>> {
        Self::entries(path, true)
    }

    fn files(&self, path: &Path) -> Option<Vec<String>> {
        Self::entries(path, false)
    }

    fn read_text(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)
    }
}
