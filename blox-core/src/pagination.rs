//! Master/detail expansion of a page's content collection.
//!
//! Every item becomes a detail page (when the page has a detail template) and
//! every `items_per_page` items open a new listing page.

use serde::Serialize;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::path::{Component, Path};

/// A collection item whose slug cannot name a detail page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("all items must have a slug: item {index} of `{page}` has none")]
    Missing { page: String, index: usize },
    #[error("item {index} of `{page}` has slug `{slug}`, which is not a single path segment")]
    Unsafe {
        page: String,
        index: usize,
        slug: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailDescriptor {
    pub slug: String,
    pub item: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDescriptor {
    #[serde(skip)]
    pub page: String,
    pub current_page: usize,
    pub total: usize,
    pub items_per_page: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub details: Vec<DetailDescriptor>,
    pub pages: Vec<PaginationDescriptor>,
}

fn slug_of(item: &Value) -> Option<&str> {
    item.get("slug")
        .and_then(Value::as_str)
        .filter(|slug| !slug.is_empty())
}

/// Slugs become output directories, so each must stay one plain segment.
fn is_path_segment(slug: &str) -> bool {
    if slug.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn checked_slug<'v>(page: &str, index: usize, item: &'v Value) -> Result<&'v str, SlugError> {
    let slug = slug_of(item).ok_or_else(|| SlugError::Missing {
        page: page.to_string(),
        index,
    })?;
    if !is_path_segment(slug) {
        return Err(SlugError::Unsafe {
            page: page.to_string(),
            index,
            slug: slug.to_string(),
        });
    }
    Ok(slug)
}

/// Expand `items` for `page`. Any item without a usable slug fails the
/// whole collection before anything is produced.
pub fn expand(
    page: &str,
    items: &[Value],
    items_per_page: NonZeroUsize,
    has_detail_template: bool,
) -> Result<Expansion, SlugError> {
    let per_page = items_per_page.get();
    let mut expansion = Expansion::default();

    for (i, item) in items.iter().enumerate() {
        let slug = checked_slug(page, i, item)?;

        if has_detail_template {
            expansion.details.push(DetailDescriptor {
                slug: slug.to_string(),
                item: item.clone(),
            });
        }

        if i % per_page == 0 {
            let current_page = (i + 1).div_ceil(per_page);
            expansion.pages.push(PaginationDescriptor {
                page: page.to_string(),
                current_page,
                total: items.len(),
                items_per_page: per_page,
                offset: (current_page - 1) * per_page,
            });
        }
    }

    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "slug": format!("item-{i}"), "title": format!("Item {i}") }))
            .collect()
    }

    fn per_page(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn five_items_two_per_page() {
        let expansion = expand("articles", &items(5), per_page(2), true).unwrap();

        assert_eq!(expansion.details.len(), 5);
        assert_eq!(expansion.details[3].slug, "item-3");
        let pages: Vec<(usize, usize)> = expansion
            .pages
            .iter()
            .map(|p| (p.current_page, p.offset))
            .collect();
        assert_eq!(pages, vec![(1, 0), (2, 2), (3, 4)]);
        assert!(expansion.pages.iter().all(|p| p.total == 5 && p.items_per_page == 2));
    }

    #[test]
    fn page_count_is_ceiling_division() {
        for n in 0..=12 {
            for k in 1..=5 {
                let expansion = expand("list", &items(n), per_page(k), true).unwrap();
                assert_eq!(expansion.pages.len(), n.div_ceil(k), "n={n} k={k}");
                assert_eq!(expansion.details.len(), n);
            }
        }
    }

    #[test]
    fn no_detail_template_still_paginates() {
        let expansion = expand("articles", &items(3), per_page(50), false).unwrap();
        assert!(expansion.details.is_empty());
        assert_eq!(expansion.pages.len(), 1);
        assert_eq!(expansion.pages[0].offset, 0);
    }

    #[test]
    fn missing_slug_fails_whole_collection() {
        let mut collection = items(10);
        collection[7] = json!({ "title": "No slug" });

        let err = expand("articles", &collection, per_page(2), true).unwrap_err();
        assert_eq!(err, SlugError::Missing { page: "articles".into(), index: 7 });
    }

    #[test]
    fn empty_slug_counts_as_missing() {
        let collection = vec![json!({ "slug": "" })];
        assert!(expand("articles", &collection, per_page(2), true).is_err());
    }

    #[test]
    fn slugs_that_leave_their_directory_are_rejected() {
        for (index, bad) in ["/tmp/evil", "../../x", "..", ".", "a/b", "a\\b"].iter().enumerate() {
            let mut collection = items(3);
            collection[1] = json!({ "slug": bad });

            let err = expand("articles", &collection, per_page(2), true).unwrap_err();
            assert_eq!(
                err,
                SlugError::Unsafe {
                    page: "articles".into(),
                    index: 1,
                    slug: bad.to_string(),
                },
                "case {index}"
            );
        }
    }

    #[test]
    fn dotted_slugs_are_plain_segments() {
        let collection = vec![json!({ "slug": "v1.2-release" }), json!({ "slug": ".well-known" })];
        let expansion = expand("articles", &collection, per_page(2), true).unwrap();
        assert_eq!(expansion.details[0].slug, "v1.2-release");
        assert_eq!(expansion.details[1].slug, ".well-known");
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let expansion = expand("articles", &items(1), per_page(2), false).unwrap();
        let value = serde_json::to_value(&expansion.pages[0]).unwrap();
        assert_eq!(value, json!({ "currentPage": 1, "total": 1, "itemsPerPage": 2, "offset": 0 }));
    }
}
