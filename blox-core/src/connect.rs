//! Connecting blocks to a page.
//!
//! Local blocks are the `partials`/`components` directories nested under the
//! layout or a page; global blocks are listed by block packages and live
//! under `packages/<kind>/<package>/`. Both feed the same accumulators, in
//! the order they are visited.

use std::path::Path;
use tracing::debug;

use crate::fs::{IMAGE_PATTERN, SCRIPT_PATTERN, STYLE_PATTERN, TemplateFs};
use crate::naming::{BlockName, NamingError};
use crate::packages::{BlockPackage, ConnectConfig};
use crate::plan::BuildPlan;
use crate::styles::BlockConnection;

/// Root of global block packages, relative to the templates root.
pub const PACKAGES_DIR: &str = "packages";
pub const LAYOUT_DIR: &str = "layout";
const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Partial,
    Component,
}

impl BlockKind {
    /// Partials are always connected before components.
    pub const ALL: [BlockKind; 2] = [BlockKind::Partial, BlockKind::Component];

    pub fn dir_name(self) -> &'static str {
        match self {
            BlockKind::Partial => "partials",
            BlockKind::Component => "components",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    Global,
}

/// A block about to be connected to a page.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    pub name: &'a str,
    pub kind: BlockKind,
    pub scope: Scope,
    pub owner: &'a str,
}

impl BlockRef<'_> {
    fn label(&self) -> String {
        match self.scope {
            Scope::Local => format!("{} block of {} page", self.name, self.owner),
            Scope::Global => format!("global {} block of {} page", self.name, self.owner),
        }
    }
}

pub struct Connector<'a> {
    fs: &'a dyn TemplateFs,
    templates_root: &'a Path,
}

impl<'a> Connector<'a> {
    pub fn new(fs: &'a dyn TemplateFs, templates_root: &'a Path) -> Self {
        Self { fs, templates_root }
    }

    /// Connect the `kind` blocks nested under `base_dir`, in listing order.
    /// A missing or unreadable blocks directory connects nothing.
    pub fn connect_local(
        &self,
        plan: &mut BuildPlan,
        conn: &mut BlockConnection,
        base_dir: &str,
        kind: BlockKind,
    ) -> Result<(), NamingError> {
        let blocks_dir = format!("{base_dir}/{}", kind.dir_name());
        let Some(blocks) = self.fs.subdirectories(&self.templates_root.join(&blocks_dir)) else {
            return Ok(());
        };

        let owner = conn.name().to_string();
        for name in &blocks {
            let block = BlockRef {
                name,
                kind,
                scope: Scope::Local,
                owner: &owner,
            };
            self.connect_block(plan, conn, block, &format!("{blocks_dir}/{name}"))?;
        }

        Ok(())
    }

    /// Connect the blocks of every resolved package: partial packages first,
    /// then component packages, each in declared order.
    pub fn connect_global(
        &self,
        plan: &mut BuildPlan,
        conn: &mut BlockConnection,
        config: &ConnectConfig,
    ) -> Result<(), NamingError> {
        for package in &config.partial_packages {
            self.connect_package(plan, conn, package, BlockKind::Partial)?;
        }
        for package in &config.component_packages {
            self.connect_package(plan, conn, package, BlockKind::Component)?;
        }
        Ok(())
    }

    fn connect_package(
        &self,
        plan: &mut BuildPlan,
        conn: &mut BlockConnection,
        package: &BlockPackage,
        kind: BlockKind,
    ) -> Result<(), NamingError> {
        let base = format!("{PACKAGES_DIR}/{}/{}", kind.dir_name(), package.name);
        let owner = conn.name().to_string();

        for entry in &package.blocks {
            let block = BlockRef {
                name: entry.name(),
                kind,
                scope: Scope::Global,
                owner: &owner,
            };
            self.connect_block(plan, conn, block, &format!("{base}/{}", entry.name()))?;
        }

        Ok(())
    }

    fn connect_block(
        &self,
        plan: &mut BuildPlan,
        conn: &mut BlockConnection,
        block: BlockRef<'_>,
        dir: &str,
    ) -> Result<(), NamingError> {
        let short = BlockName::parse(block.name)?.short;
        let path = self.templates_root.join(dir);
        debug!(
            block = block.name,
            page = block.owner,
            kind = block.kind.dir_name(),
            scope = ?block.scope,
            "connecting block"
        );

        if self.fs.contains_match(&path, &SCRIPT_PATTERN) {
            plan.entry
                .append_script(conn.name(), format!("./src/templates/{dir}/{short}.js"));
            conn.has_scripts = true;
        }

        if self.fs.contains_match(&path, &STYLE_PATTERN) {
            conn.import_style(&block.label(), &format!("{dir}/{short}"));
        }

        if let Some(files) = self.fs.files(&path.join(IMAGES_DIR)) {
            for image in files.iter().filter(|file| IMAGE_PATTERN.is_match(file)) {
                conn.require_image(&format!("{dir}/{IMAGES_DIR}/{image}"));
            }
        }
        plan.images.push_str(&conn.take_pending_images());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryMap;
    use crate::fs::DiskFs;
    use crate::packages::PackageDocument;

    fn block(root: &Path, dir: &str, files: &[&str]) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        for file in files {
            let file_path = path.join(file);
            std::fs::create_dir_all(file_path.parent().unwrap()).unwrap();
            std::fs::write(file_path, "").unwrap();
        }
    }

    fn setup() -> (BuildPlan, BlockConnection) {
        let mut plan = BuildPlan::new(EntryMap::new(Vec::new()));
        plan.entry.create_entry("home");
        (plan, BlockConnection::new("home", false))
    }

    #[test]
    fn local_blocks_connect_in_listing_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        block(root, "pages/blox.page.home/partials/blox.partial.zfooter", &["zfooter.scss"]);
        block(
            root,
            "pages/blox.page.home/partials/blox.partial.header",
            &["header.scss", "header.js"],
        );

        let (mut plan, mut conn) = setup();
        Connector::new(&DiskFs, root)
            .connect_local(&mut plan, &mut conn, "pages/blox.page.home", BlockKind::Partial)
            .unwrap();

        let style = conn.style();
        let header = style.find("blox.partial.header/header\"").unwrap();
        let footer = style.find("blox.partial.zfooter/zfooter\"").unwrap();
        assert!(header < footer);
        assert!(style.contains("Auto-generated Sass for blox.partial.header block of home page"));
        assert!(conn.has_scripts);
        assert_eq!(
            plan.entry.get("home").unwrap().last().unwrap(),
            "./src/templates/pages/blox.page.home/partials/blox.partial.header/header.js"
        );
    }

    #[test]
    fn missing_blocks_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut plan, mut conn) = setup();
        Connector::new(&DiskFs, tmp.path())
            .connect_local(&mut plan, &mut conn, "layout", BlockKind::Component)
            .unwrap();

        assert_eq!(conn.style(), crate::styles::STYLE_SEED);
        assert!(plan.images.is_empty());
    }

    #[test]
    fn malformed_block_name_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        block(tmp.path(), "layout/partials/header", &["header.scss"]);

        let (mut plan, mut conn) = setup();
        let err = Connector::new(&DiskFs, tmp.path())
            .connect_local(&mut plan, &mut conn, "layout", BlockKind::Partial)
            .unwrap_err();
        assert_eq!(err, NamingError::Malformed("header".into()));
    }

    #[test]
    fn images_become_requires() {
        let tmp = tempfile::tempdir().unwrap();
        block(
            tmp.path(),
            "layout/components/blox.component.logo",
            &["images/logo.png", "images/notes.txt", "images/banner.svg"],
        );

        let (mut plan, mut conn) = setup();
        Connector::new(&DiskFs, tmp.path())
            .connect_local(&mut plan, &mut conn, "layout", BlockKind::Component)
            .unwrap();

        assert_eq!(
            plan.images,
            "require(\"../../../templates/layout/components/blox.component.logo/images/banner.svg\");\n\
             require(\"../../../templates/layout/components/blox.component.logo/images/logo.png\");\n"
        );
        assert!(conn.take_pending_images().is_empty());
    }

    #[test]
    fn global_packages_follow_declared_order() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        block(root, "packages/partials/chrome/blox.partial.nav", &["nav.scss"]);
        block(root, "packages/partials/chrome/blox.partial.banner", &["banner.scss", "banner.js"]);
        block(root, "packages/components/widgets/blox.component.card.wide", &["card.scss"]);

        let page = PackageDocument::parse(
            "componentPackages:\n  - name: widgets\n    blocks: [blox.component.card.wide]\n",
        );
        let layout = PackageDocument::parse(
            "partialPackages:\n  - name: chrome\n    blocks: [blox.partial.nav, blox.partial.banner]\n",
        );
        let config = ConnectConfig::merge(page, layout, "home", "blox.page.home");

        let (mut plan, mut conn) = setup();
        Connector::new(&DiskFs, root)
            .connect_global(&mut plan, &mut conn, &config)
            .unwrap();

        let style = conn.style();
        let nav = style.find("packages/partials/chrome/blox.partial.nav/nav\"").unwrap();
        let banner = style.find("packages/partials/chrome/blox.partial.banner/banner\"").unwrap();
        let card = style
            .find("packages/components/widgets/blox.component.card.wide/card\"")
            .unwrap();
        assert!(nav < banner && banner < card);
        assert!(style.contains("global blox.partial.nav block of home page"));
        assert_eq!(
            plan.entry.get("home").unwrap().last().unwrap(),
            "./src/templates/packages/partials/chrome/blox.partial.banner/banner.js"
        );
    }

    #[test]
    fn declared_block_missing_on_disk_connects_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = PackageDocument::parse(
            "partialPackages:\n  - name: chrome\n    blocks: [blox.partial.ghost]\n",
        );
        let config =
            ConnectConfig::merge(PackageDocument::default(), layout, "home", "blox.page.home");

        let (mut plan, mut conn) = setup();
        Connector::new(&DiskFs, tmp.path())
            .connect_global(&mut plan, &mut conn, &config)
            .unwrap();
        assert_eq!(conn.style(), crate::styles::STYLE_SEED);
    }
}
