//! The tree walker: discovers pages (and page packages) under
//! `templates/pages` and drives composition, block connection and
//! master/detail expansion for each of them.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Config, ConfigError, DEFAULT_ITEMS_PER_PAGE};
use crate::connect::{BlockKind, Connector, LAYOUT_DIR};
use crate::data::Snapshot;
use crate::entry::{DEFAULT_ENTRY_PATH, EntryMap};
use crate::error::BuildError;
use crate::fs::{DiskFs, SCRIPT_PATTERN, STYLE_PATTERN, TemplateFs};
use crate::naming::BlockName;
use crate::packages::{ConnectConfig, read_app_data};
use crate::page::{Composer, DETAIL_DIR, PageBuilder, PageDescriptor};
use crate::pagination;
use crate::plan::BuildPlan;
use crate::styles::BlockConnection;

pub const TEMPLATES_DIR: &str = "src/templates";
pub const PAGES_DIR: &str = "pages";
/// Reserved directory name under `pages` holding page packages.
pub const PAGE_PACKAGES_DIR: &str = "packages";

/// How a directory found while scanning a page level is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEntry {
    Page(String),
    PackagesContainer,
}

impl LevelEntry {
    pub fn classify(name: &str) -> Self {
        if name == PAGE_PACKAGES_DIR {
            LevelEntry::PackagesContainer
        } else {
            LevelEntry::Page(name.to_string())
        }
    }
}

pub struct BloxBuilder {
    project_root: PathBuf,
    fs: Box<dyn TemplateFs>,
    entry_paths: Vec<String>,
    items_per_page: NonZeroUsize,
    template_extension: String,
    data: Map<String, Value>,
}

impl Default for BloxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BloxBuilder {
    pub fn new() -> Self {
        Self {
            project_root: PathBuf::from("."),
            fs: Box::new(DiskFs),
            entry_paths: vec![DEFAULT_ENTRY_PATH.to_string()],
            items_per_page: NonZeroUsize::new(DEFAULT_ITEMS_PER_PAGE).unwrap_or(NonZeroUsize::MIN),
            template_extension: "njk".to_string(),
            data: Map::new(),
        }
    }

    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = path.as_ref().to_path_buf();
        self
    }

    pub fn filesystem<F: TemplateFs + 'static>(mut self, fs: F) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn entry_paths(mut self, paths: Vec<String>) -> Self {
        self.entry_paths = paths;
        self
    }

    pub fn items_per_page(mut self, items: NonZeroUsize) -> Self {
        self.items_per_page = items;
        self
    }

    pub fn template_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.template_extension = extension.into();
        self
    }

    // Extra context for every page
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Apply everything a project config controls.
    pub fn config(self, config: &Config) -> Result<Self, ConfigError> {
        Ok(self
            .entry_paths(config.entry_paths.clone())
            .items_per_page(config.items_per_page()?)
            .template_extension(config.template_extension.clone())
            .data(config.data.clone()))
    }

    pub fn build(self) -> Blox {
        Blox {
            templates_root: self.project_root.join(TEMPLATES_DIR),
            project_root: self.project_root,
            fs: self.fs,
            entry_paths: self.entry_paths,
            items_per_page: self.items_per_page,
            template_extension: self.template_extension,
            data: self.data,
        }
    }
}

/// The block resolution and page composition engine.
pub struct Blox {
    project_root: PathBuf,
    templates_root: PathBuf,
    fs: Box<dyn TemplateFs>,
    entry_paths: Vec<String>,
    items_per_page: NonZeroUsize,
    template_extension: String,
    data: Map<String, Value>,
}

impl Blox {
    pub fn builder() -> BloxBuilder {
        BloxBuilder::new()
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    pub fn template_extension(&self) -> &str {
        &self.template_extension
    }

    pub fn filesystem(&self) -> &dyn TemplateFs {
        self.fs.as_ref()
    }

    /// Walk the page tree, handing every page unit to `pages`, and return
    /// the plan. Nothing is written to disk; see [`BuildPlan::write`].
    pub fn run(
        &self,
        snapshot: &Snapshot,
        pages: &mut dyn PageBuilder,
    ) -> Result<BuildPlan, BuildError> {
        let pages_root = self.templates_root.join(PAGES_DIR);
        if self.fs.subdirectories(&pages_root).is_none() {
            return Err(BuildError::MissingPagesDir(pages_root));
        }

        let app = read_app_data(self.fs.as_ref(), &self.templates_root.join("app.yaml"));
        let mut run = Run {
            blox: self,
            composer: Composer {
                app: &app,
                db: snapshot,
                extra: &self.data,
                template_extension: &self.template_extension,
            },
            connector: Connector::new(self.fs.as_ref(), &self.templates_root),
            plan: BuildPlan::new(EntryMap::new(self.entry_paths.clone())),
            claimed: HashMap::new(),
            pages,
        };

        run.scan_level(PAGES_DIR, &[])?;

        let plan = run.plan;
        info!(
            entries = plan.entry.len(),
            styles = plan.styles.len(),
            "build plan ready"
        );
        Ok(plan)
    }
}

/// State of a single run, threaded through the walk.
struct Run<'a, 'p> {
    blox: &'a Blox,
    composer: Composer<'a>,
    connector: Connector<'a>,
    plan: BuildPlan,
    /// Logical page name -> directory that first produced it.
    claimed: HashMap<String, String>,
    pages: &'a mut (dyn PageBuilder + 'p),
}

impl Run<'_, '_> {
    fn fs(&self) -> &dyn TemplateFs {
        self.blox.fs.as_ref()
    }

    fn path(&self, dir: &str) -> PathBuf {
        self.blox.templates_root.join(dir)
    }

    /// Reserve a logical name. Entries, stylesheets and outputs are keyed by
    /// it, so a second directory resolving to the same name is fatal.
    fn claim(&mut self, page: &PageDescriptor) -> Result<(), BuildError> {
        if let Some(first) = self.claimed.get(&page.name) {
            return Err(BuildError::DuplicatePage {
                name: page.name.clone(),
                first: first.clone(),
                second: page.dir.clone(),
            });
        }
        self.claimed.insert(page.name.clone(), page.dir.clone());
        Ok(())
    }

    fn scan_level(&mut self, dir: &str, chain: &[String]) -> Result<(), BuildError> {
        let entries = self.fs().subdirectories(&self.path(dir)).unwrap_or_default();

        for name in entries {
            match LevelEntry::classify(&name) {
                LevelEntry::PackagesContainer => {
                    self.recurse_packages(&format!("{dir}/{name}"), chain)?
                }
                LevelEntry::Page(full_name) => self.compose_page(dir, &full_name, chain)?,
            }
        }

        Ok(())
    }

    fn recurse_packages(&mut self, dir: &str, chain: &[String]) -> Result<(), BuildError> {
        let packages = self.fs().subdirectories(&self.path(dir)).unwrap_or_default();

        for package in packages {
            debug!(package = %package, "entering page package");
            let mut nested = chain.to_vec();
            nested.push(package.clone());
            self.scan_level(&format!("{dir}/{package}"), &nested)?;
        }

        Ok(())
    }

    fn compose_page(
        &mut self,
        parent: &str,
        full_name: &str,
        chain: &[String],
    ) -> Result<(), BuildError> {
        let block = BlockName::parse(full_name)?;
        let mut page = PageDescriptor::new(block, format!("{parent}/{full_name}"), chain.to_vec());
        self.claim(&page)?;
        let page_path = self.path(&page.dir);
        page.has_scripts = self.fs().contains_match(&page_path, &SCRIPT_PATTERN);
        page.has_styles = self.fs().contains_match(&page_path, &STYLE_PATTERN);
        info!(page = %page.name, dir = %page.dir, "composing page");

        self.plan.entry.create_entry(&page.name);
        if page.has_scripts {
            self.plan.entry.append_script(&page.name, page.script_module());
        }
        self.pages.build_page(self.composer.master(&page))?;
        self.connect_page(&page, &format!("{} page", page.name))?;

        let has_detail_dir = self
            .fs()
            .subdirectories(&page_path)
            .is_some_and(|dirs| dirs.iter().any(|dir| dir == DETAIL_DIR));
        if has_detail_dir {
            self.expand_master_detail(&page)?;
        }

        Ok(())
    }

    fn expand_master_detail(&mut self, page: &PageDescriptor) -> Result<(), BuildError> {
        let db = self.composer.db;
        let Some(items) = db.collection(&page.name).filter(|items| !items.is_empty()) else {
            debug!(page = %page.name, "detail directory without content, skipping");
            return Ok(());
        };

        let mut detail = page.detail();
        let detail_path = self.path(&detail.dir);
        let template_file = format!("{}.{}", detail.short, self.blox.template_extension);
        let has_template = self
            .fs()
            .files(&detail_path)
            .is_some_and(|files| files.contains(&template_file));

        let expansion =
            pagination::expand(&page.name, items, self.blox.items_per_page, has_template)?;

        if has_template {
            self.claim(&detail)?;
            detail.has_scripts = self.fs().contains_match(&detail_path, &SCRIPT_PATTERN);
            detail.has_styles = self.fs().contains_match(&detail_path, &STYLE_PATTERN);
            self.plan.entry.create_entry(&detail.name);
            if detail.has_scripts {
                self.plan.entry.append_script(&detail.name, detail.script_module());
            }
        }

        for item in &expansion.details {
            self.pages.build_page(self.composer.detail(page, &detail, item))?;
        }
        for listing in &expansion.pages {
            self.pages.build_page(self.composer.pagination(page, listing))?;
        }
        info!(
            page = %page.name,
            details = expansion.details.len(),
            listings = expansion.pages.len(),
            "expanded master/detail"
        );

        if has_template {
            self.connect_page(&detail, &format!("detail page of {} master page", page.name))?;
        }

        Ok(())
    }

    /// Connect the page stylesheet, then layout blocks, page blocks and
    /// global packages, and record the generated stylesheet.
    fn connect_page(&mut self, page: &PageDescriptor, label: &str) -> Result<(), BuildError> {
        let mut conn = BlockConnection::new(&page.name, page.has_scripts);
        if page.has_styles {
            conn.import_style(label, &page.style_module());
        }

        for base in [LAYOUT_DIR, page.dir.as_str()] {
            for kind in BlockKind::ALL {
                self.connector.connect_local(&mut self.plan, &mut conn, base, kind)?;
            }
        }

        let config = ConnectConfig::resolve(
            self.fs(),
            &self.path(&format!("{}/{}.yaml", page.dir, page.short)),
            &self.path(&format!("{LAYOUT_DIR}/{LAYOUT_DIR}.yaml")),
            &page.name,
            &page.full_name,
        );
        self.connector.connect_global(&mut self.plan, &mut conn, &config)?;

        self.plan.styles.push(conn.finish());
        Ok(())
    }
}
