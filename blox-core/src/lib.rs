pub mod config;
pub mod connect;
pub mod data;
pub mod entry;
pub mod error;
pub mod fs;
pub mod naming;
pub mod packages;
pub mod page;
pub mod pagination;
pub mod plan;
pub mod styles;
pub mod template;
pub mod walker;

// Re-export main types
pub use data::{Mode, Snapshot, SnapshotLoader};
pub use entry::EntryMap;
pub use error::BuildError;
pub use fs::{DiskFs, TemplateFs};
pub use naming::{BlockName, NamingError};
pub use page::{PageBuilder, PageDescriptor, PageUnit};
pub use plan::{BuildPlan, GeneratedStyle};
pub use template::{TemplateError, TeraPageBuilder};
pub use walker::{Blox, BloxBuilder};
