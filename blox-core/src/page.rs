//! Pages and the page-generation units handed to a page builder.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::path::PathBuf;

use crate::data::Snapshot;
use crate::naming::BlockName;
use crate::pagination::{DetailDescriptor, PaginationDescriptor};
use crate::template::TemplateError;

/// Subdirectory of a page holding its detail template.
pub const DETAIL_DIR: &str = "detail";

/// A discovered page directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// Logical name: the short name, prefixed by the package chain.
    pub name: String,
    pub short: String,
    pub full_name: String,
    /// Page packages this page is nested in, outermost first.
    pub chain: Vec<String>,
    /// Directory relative to the templates root, `/`-separated.
    pub dir: String,
    pub has_scripts: bool,
    pub has_styles: bool,
}

impl PageDescriptor {
    pub fn new(block: BlockName, dir: String, chain: Vec<String>) -> Self {
        let name = chain
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(block.short.as_str()))
            .collect::<Vec<_>>()
            .join("-");

        Self {
            name,
            short: block.short,
            full_name: block.full,
            chain,
            dir,
            has_scripts: false,
            has_styles: false,
        }
    }

    /// The detail pseudo-page living in this page's `detail` directory.
    pub fn detail(&self) -> PageDescriptor {
        Self {
            name: format!("{}-detail", self.name),
            short: format!("{}-detail", self.short),
            full_name: self.full_name.clone(),
            chain: self.chain.clone(),
            dir: format!("{}/{DETAIL_DIR}", self.dir),
            has_scripts: false,
            has_styles: false,
        }
    }

    /// Template path relative to the templates root.
    pub fn template(&self, extension: &str) -> String {
        format!("{}/{}.{extension}", self.dir, self.short)
    }

    /// The page's own stylesheet module, without extension.
    pub fn style_module(&self) -> String {
        format!("{}/{}", self.dir, self.short)
    }

    pub fn script_module(&self) -> String {
        format!("./src/templates/{}/{}.js", self.dir, self.short)
    }

    /// URL segments of the directory holding this page's family: its
    /// detail and listing pages live below it.
    pub fn segments(&self) -> Vec<&str> {
        self.chain
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.short.as_str()))
            .collect()
    }

    /// URL segments of the master page itself. The top-level home page is
    /// the site root.
    pub fn master_segments(&self) -> Vec<&str> {
        if self.chain.is_empty() && self.short == "home" {
            return Vec::new();
        }
        self.segments()
    }
}

/// Output `index.html` below `segments`, and the matching relative prefix
/// back to the site root.
fn output_location(segments: &[&str]) -> (PathBuf, String) {
    let mut output: PathBuf = segments.iter().collect();
    output.push("index.html");
    (output, "../".repeat(segments.len()))
}

/// One page to generate: template, merged context and output path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageUnit {
    pub template: String,
    pub output: PathBuf,
    pub context: Value,
}

pub trait PageBuilder {
    fn build_page(&mut self, unit: PageUnit) -> Result<(), TemplateError>;
}

/// Collects units without rendering them.
impl PageBuilder for Vec<PageUnit> {
    fn build_page(&mut self, unit: PageUnit) -> Result<(), TemplateError> {
        self.push(unit);
        Ok(())
    }
}

/// Assembles page contexts from the run-wide data.
pub struct Composer<'a> {
    pub app: &'a Value,
    pub db: &'a Snapshot,
    pub extra: &'a Map<String, Value>,
    pub template_extension: &'a str,
}

impl Composer<'_> {
    fn context(&self, page: Value) -> Value {
        let mut context = Map::new();
        context.insert("app".into(), self.app.clone());
        for (key, value) in self.extra {
            context.insert(key.clone(), value.clone());
        }
        context.insert("db".into(), self.db.as_value().clone());
        context.insert("page".into(), page);
        Value::Object(context)
    }

    fn page_value(
        &self,
        page: &PageDescriptor,
        name: &str,
        title: &str,
        path: String,
    ) -> Map<String, Value> {
        let value = json!({
            "name": name,
            "title": title,
            "rootPage": page.name,
            "path": path,
            "hasScripts": page.has_scripts,
            "hasStyles": page.has_styles,
        });
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn title(&self, page: &PageDescriptor) -> &str {
        self.db.plural_name(&page.name).unwrap_or_default()
    }

    /// The page itself.
    pub fn master(&self, page: &PageDescriptor) -> PageUnit {
        let (output, path) = output_location(&page.master_segments());
        let fields = self.page_value(page, &page.name, self.title(page), path);

        PageUnit {
            template: page.template(self.template_extension),
            output,
            context: self.context(Value::Object(fields)),
        }
    }

    /// One detail page of a master/detail family. `detail` carries the
    /// detail pseudo-page's own flags and template.
    pub fn detail(
        &self,
        page: &PageDescriptor,
        detail: &PageDescriptor,
        item: &DetailDescriptor,
    ) -> PageUnit {
        let mut segments = page.segments();
        segments.push(&item.slug);
        let (output, path) = output_location(&segments);

        let title = item.item.get("title").and_then(Value::as_str).unwrap_or_default();
        let mut fields = self.page_value(detail, &detail.name, title, path);
        fields.insert("rootPage".into(), Value::String(page.name.clone()));
        fields.insert("item".into(), item.item.clone());

        PageUnit {
            template: detail.template(self.template_extension),
            output,
            context: self.context(Value::Object(fields)),
        }
    }

    /// One listing page of a master/detail family, rendered with the master
    /// template.
    pub fn pagination(&self, page: &PageDescriptor, pagination: &PaginationDescriptor) -> PageUnit {
        let listing = format!("page-{}", pagination.current_page);
        let mut segments = page.segments();
        segments.push(&listing);
        let (output, path) = output_location(&segments);

        let mut fields = self.page_value(page, &page.name, self.title(page), path);
        fields.insert(
            "pagination".into(),
            serde_json::to_value(pagination).unwrap_or(Value::Null),
        );

        PageUnit {
            template: page.template(self.template_extension),
            output,
            context: self.context(Value::Object(fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::expand;
    use std::num::NonZeroUsize;

    fn page(full: &str, chain: &[&str]) -> PageDescriptor {
        let block = BlockName::parse(full).unwrap();
        let chain: Vec<String> = chain.iter().map(|s| s.to_string()).collect();
        let dir = format!("pages/{full}");
        PageDescriptor::new(block, dir, chain)
    }

    fn composer<'a>(
        app: &'a Value,
        db: &'a Snapshot,
        extra: &'a Map<String, Value>,
    ) -> Composer<'a> {
        Composer {
            app,
            db,
            extra,
            template_extension: "njk",
        }
    }

    #[test]
    fn home_renders_to_root_index() {
        let app = json!({ "name": "Demo" });
        let db = Snapshot::default();
        let extra = Map::new();
        let unit = composer(&app, &db, &extra).master(&page("blox.page.home", &[]));

        assert_eq!(unit.template, "pages/blox.page.home/home.njk");
        assert_eq!(unit.output, PathBuf::from("index.html"));
        assert_eq!(unit.context["page"]["path"], "");
        assert_eq!(unit.context["page"]["name"], "home");
        assert_eq!(unit.context["app"]["name"], "Demo");
    }

    #[test]
    fn home_family_stays_under_home() {
        let master = page("blox.page.home", &[]);
        let detail = master.detail();
        let items = vec![json!({ "slug": "about", "title": "About" })];
        let expansion = expand("home", &items, NonZeroUsize::new(2).unwrap(), true).unwrap();

        let app = json!({});
        let db = Snapshot::default();
        let extra = Map::new();
        let composer = composer(&app, &db, &extra);

        assert_eq!(composer.master(&master).output, PathBuf::from("index.html"));

        let unit = composer.detail(&master, &detail, &expansion.details[0]);
        assert_eq!(unit.output, PathBuf::from("home/about/index.html"));
        assert_eq!(unit.context["page"]["path"], "../../");

        let unit = composer.pagination(&master, &expansion.pages[0]);
        assert_eq!(unit.output, PathBuf::from("home/page-1/index.html"));
    }

    #[test]
    fn package_pages_nest_under_their_chain() {
        let page = page("blox.page.cart", &["shop"]);
        assert_eq!(page.name, "shop-cart");

        let app = json!({});
        let db = Snapshot::default();
        let extra = Map::new();
        let unit = composer(&app, &db, &extra).master(&page);
        assert_eq!(unit.output, PathBuf::from("shop/cart/index.html"));
        assert_eq!(unit.context["page"]["path"], "../../");
    }

    #[test]
    fn extra_data_cannot_shadow_page_or_db() {
        let app = json!({});
        let db = Snapshot::new(json!({ "about": { "contentType": { "pluralName": "Abouts" } } }));
        let extra: Map<String, Value> =
            serde_json::from_value(json!({ "page": "x", "year": 2019 })).unwrap();
        let unit = composer(&app, &db, &extra).master(&page("blox.page.about", &[]));

        assert_eq!(unit.context["year"], 2019);
        assert_eq!(unit.context["page"]["title"], "Abouts");
        assert_eq!(unit.context["db"]["about"]["contentType"]["pluralName"], "Abouts");
    }

    #[test]
    fn detail_and_pagination_units() {
        let master = page("blox.page.articles", &[]);
        let detail = master.detail();
        assert_eq!(detail.name, "articles-detail");

        let items = vec![json!({ "slug": "first", "title": "First" })];
        let expansion = expand("articles", &items, NonZeroUsize::new(2).unwrap(), true).unwrap();

        let app = json!({});
        let db = Snapshot::default();
        let extra = Map::new();
        let composer = composer(&app, &db, &extra);

        let unit = composer.detail(&master, &detail, &expansion.details[0]);
        assert_eq!(unit.template, "pages/blox.page.articles/detail/articles-detail.njk");
        assert_eq!(unit.output, PathBuf::from("articles/first/index.html"));
        assert_eq!(unit.context["page"]["title"], "First");
        assert_eq!(unit.context["page"]["rootPage"], "articles");
        assert_eq!(unit.context["page"]["path"], "../../");
        assert_eq!(unit.context["page"]["item"]["slug"], "first");

        let unit = composer.pagination(&master, &expansion.pages[0]);
        assert_eq!(unit.template, "pages/blox.page.articles/articles.njk");
        assert_eq!(unit.output, PathBuf::from("articles/page-1/index.html"));
        assert_eq!(unit.context["page"]["pagination"]["currentPage"], 1);
        assert_eq!(unit.context["page"]["pagination"]["offset"], 0);
    }
}
