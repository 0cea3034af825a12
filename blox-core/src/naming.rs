//! Block directory naming convention.
//!
//! Every page and block directory is named
//! `<namespace>.<type>.<short-name>[.<variant>]`, e.g. `blox.page.home` or
//! `blox.component.nav.compact`. The short name is what ends up in file names
//! and generated import paths; the full name only locates the directory.

/// Reserved prefix for project-level blocks.
pub const BLOX_NAMESPACE: &str = "blox";

/// Marker for blocks that live at the root of a block package.
pub const PACKAGE_NAMESPACE: &str = "pkg";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("`{0}` does not follow the <namespace>.<type>.<name>[.<variant>] naming convention")]
    Malformed(String),
    #[error("`{name}` uses unknown namespace `{namespace}` (expected `blox` or `pkg`)")]
    UnknownNamespace { name: String, namespace: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockName {
    pub full: String,
    pub namespace: String,
    pub kind: String,
    pub short: String,
    pub variant: Option<String>,
}

impl BlockName {
    pub fn parse(full: &str) -> Result<Self, NamingError> {
        let malformed = || NamingError::Malformed(full.to_string());

        let mut parts = full.splitn(4, '.');
        let namespace = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let kind = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let short = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let variant = match parts.next() {
            Some("") => return Err(malformed()),
            Some(v) => Some(v.to_string()),
            None => None,
        };

        if namespace != BLOX_NAMESPACE && namespace != PACKAGE_NAMESPACE {
            return Err(NamingError::UnknownNamespace {
                name: full.to_string(),
                namespace: namespace.to_string(),
            });
        }

        Ok(Self {
            full: full.to_string(),
            namespace: namespace.to_string(),
            kind: kind.to_string(),
            short: short.to_string(),
            variant,
        })
    }
}

/// Short name of a fully-qualified block directory name.
pub fn short_name(full: &str) -> Result<String, NamingError> {
    BlockName::parse(full).map(|name| name.short)
}
