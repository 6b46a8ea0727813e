//! Collections of rendered documents and the paginated blog index.
//!
//! Collections are built once, after every document has been rendered, and
//! hold owned summaries so later failures cannot leave dangling entries.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use log::warn;

use super::document::Document;
use super::pipeline::ProcessingDocument;
use super::render::EntrySummary;

/// Named, ordered collections of entry summaries.
#[derive(Debug, Default)]
pub struct Collections {
    collections: BTreeMap<String, Vec<EntrySummary>>,
    tags: BTreeMap<String, Vec<EntrySummary>>,
    categories: BTreeMap<String, Vec<EntrySummary>>,
    /// Source path of each post to its position in `posts`
    post_positions: HashMap<String, usize>,
}

impl Collections {
    /// Partition rendered documents into collections.
    ///
    /// `posts` and `pages` always exist, as does every name in `configured`.
    /// Posts are ordered newest first with ties broken by source path; undated
    /// posts go last. Every other collection is ordered by source path.
    pub fn index(docs: &[ProcessingDocument], configured: &[String]) -> Self {
        let mut grouped: BTreeMap<String, Vec<&ProcessingDocument>> = BTreeMap::new();
        grouped.entry("posts".to_string()).or_default();
        grouped.entry("pages".to_string()).or_default();
        for name in configured {
            grouped.entry(name.clone()).or_default();
        }

        for doc in docs {
            grouped
                .entry(doc.doc.collection().to_string())
                .or_default()
                .push(doc);
        }

        let mut collections = BTreeMap::new();
        for (name, mut members) in grouped {
            if name == "posts" {
                sort_posts(&mut members);
            } else {
                members.sort_by(|a, b| a.doc.source_path.cmp(&b.doc.source_path));
            }
            let summaries = members.into_iter().map(summarize).collect::<Vec<_>>();
            collections.insert(name, summaries);
        }

        let posts = collections.get("posts").map(Vec::as_slice).unwrap_or(&[]);
        let post_positions = posts
            .iter()
            .enumerate()
            .map(|(position, post)| (post.path.clone(), position))
            .collect();

        let mut tags: BTreeMap<String, Vec<EntrySummary>> = BTreeMap::new();
        let mut categories: BTreeMap<String, Vec<EntrySummary>> = BTreeMap::new();
        for post in posts {
            for tag in &post.tags {
                tags.entry(tag.clone()).or_default().push(post.clone());
            }
            for category in &post.categories {
                categories
                    .entry(category.clone())
                    .or_default()
                    .push(post.clone());
            }
        }

        Self {
            collections,
            tags,
            categories,
            post_positions,
        }
    }

    /// Posts, newest first.
    pub fn posts(&self) -> &[EntrySummary] {
        self.get("posts")
    }

    pub fn pages(&self) -> &[EntrySummary] {
        self.get("pages")
    }

    /// A collection by name; unknown names are empty.
    pub fn get(&self, name: &str) -> &[EntrySummary] {
        self.collections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all(&self) -> &BTreeMap<String, Vec<EntrySummary>> {
        &self.collections
    }

    pub fn tags(&self) -> &BTreeMap<String, Vec<EntrySummary>> {
        &self.tags
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<EntrySummary>> {
        &self.categories
    }

    /// The newer and older neighbours of a post, by source path.
    pub fn neighbours(&self, source_path: &str) -> (Option<&EntrySummary>, Option<&EntrySummary>) {
        let Some(&position) = self.post_positions.get(source_path) else {
            return (None, None);
        };
        let posts = self.posts();
        let newer = position.checked_sub(1).and_then(|i| posts.get(i));
        let older = posts.get(position + 1);
        (newer, older)
    }
}

/// Newest first, ties by source path; undated posts last, by source path.
fn sort_posts(posts: &mut [&ProcessingDocument]) {
    posts.sort_by(|a, b| match (a.doc.date, b.doc.date) {
        (Some(da), Some(db)) => db
            .cmp(&da)
            .then_with(|| a.doc.source_path.cmp(&b.doc.source_path)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.doc.source_path.cmp(&b.doc.source_path),
    });

    for post in posts.iter().filter(|p| p.doc.date.is_none()) {
        warn!(
            "{}: post has no valid date, listing it last",
            post.doc.source_path.display()
        );
    }
}

/// Format a document date the way templates receive it.
pub fn format_date(doc: &Document) -> Option<String> {
    doc.date.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// The listing entry for a rendered document.
pub fn summarize(doc: &ProcessingDocument) -> EntrySummary {
    let fm = &doc.doc.front_matter;
    EntrySummary {
        title: doc.doc.title(),
        url: doc.doc.url_path.clone(),
        date: format_date(&doc.doc),
        excerpt: doc.excerpt.clone(),
        description: fm.description.clone(),
        tags: fm.tags.clone(),
        categories: fm.categories.clone(),
        collection: doc.doc.collection().to_string(),
        path: doc.source_key(),
        extra: fm.extra.clone(),
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPage {
    /// Zero-based page index
    pub index: usize,
    /// Slice of the listing shown on this page
    pub range: Range<usize>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

/// Split `total` items into pages of `per_page`.
///
/// Always yields at least one page, so an empty listing still gets an
/// (empty) first page.
pub fn paginate(total: usize, per_page: usize) -> Vec<IndexPage> {
    let per_page = per_page.max(1);
    let count = total.div_ceil(per_page).max(1);

    (0..count)
        .map(|index| {
            let start = index * per_page;
            let end = (start + per_page).min(total);
            IndexPage {
                index,
                range: start..end,
                previous: index.checked_sub(1),
                next: (index + 1 < count).then_some(index + 1),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::document::DocumentKind;
    use crate::build::front_matter::parse_date;
    use std::path::PathBuf;

    fn doc(path: &str, kind: DocumentKind, date: Option<&str>) -> ProcessingDocument {
        let mut doc = Document::discovered(PathBuf::from(path), kind);
        doc.date = date.and_then(parse_date);
        doc.url_path = format!("/{}/", doc.slug);
        ProcessingDocument::new(doc)
    }

    fn post(path: &str, date: Option<&str>) -> ProcessingDocument {
        doc(path, DocumentKind::Post, date)
    }

    fn paths(entries: &[EntrySummary]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_posts_newest_first() {
        let docs = vec![
            post("_posts/2026-02-22-mcp.md", Some("2026-02-22")),
            post("_posts/2026-02-27-react.md", Some("2026-02-27")),
            post("_posts/2025-12-01-old.md", Some("2025-12-01")),
        ];
        let collections = Collections::index(&docs, &[]);

        assert_eq!(
            paths(collections.posts()),
            vec![
                "_posts/2026-02-27-react.md",
                "_posts/2026-02-22-mcp.md",
                "_posts/2025-12-01-old.md"
            ]
        );
    }

    #[test]
    fn test_same_date_ties_by_source_path() {
        let docs = vec![
            post("_posts/b.md", Some("2026-02-22")),
            post("_posts/a.md", Some("2026-02-22")),
        ];
        let collections = Collections::index(&docs, &[]);
        assert_eq!(paths(collections.posts()), vec!["_posts/a.md", "_posts/b.md"]);
    }

    #[test]
    fn test_undated_posts_go_last() {
        let docs = vec![
            post("_posts/z-undated.md", None),
            post("_posts/a-undated.md", None),
            post("_posts/2020-01-01-ancient.md", Some("2020-01-01")),
        ];
        let collections = Collections::index(&docs, &[]);
        assert_eq!(
            paths(collections.posts()),
            vec![
                "_posts/2020-01-01-ancient.md",
                "_posts/a-undated.md",
                "_posts/z-undated.md"
            ]
        );
    }

    #[test]
    fn test_partition_by_kind_and_front_matter() {
        let mut moved = doc("notes/idea.md", DocumentKind::Page, None);
        moved.doc.front_matter.collection = Some("recipes".to_string());
        let docs = vec![
            doc("about.md", DocumentKind::Page, None),
            doc(
                "_recipes/soup.md",
                DocumentKind::Collection("recipes".to_string()),
                None,
            ),
            moved,
            post("_posts/2026-02-22-mcp.md", Some("2026-02-22")),
        ];
        let collections = Collections::index(&docs, &["recipes".to_string(), "talks".to_string()]);

        assert_eq!(paths(collections.pages()), vec!["about.md"]);
        assert_eq!(
            paths(collections.get("recipes")),
            vec!["_recipes/soup.md", "notes/idea.md"]
        );
        assert!(collections.get("talks").is_empty());
        assert!(collections.all().contains_key("talks"));
        assert_eq!(collections.posts().len(), 1);
    }

    #[test]
    fn test_empty_site_has_posts_and_pages() {
        let collections = Collections::index(&[], &[]);
        assert!(collections.posts().is_empty());
        assert!(collections.all().contains_key("posts"));
        assert!(collections.all().contains_key("pages"));
    }

    #[test]
    fn test_tags_and_neighbours() {
        let mut first = post("_posts/2026-02-22-mcp.md", Some("2026-02-22"));
        first.doc.front_matter.tags = vec!["mcp".to_string()];
        let mut second = post("_posts/2026-02-27-react.md", Some("2026-02-27"));
        second.doc.front_matter.tags = vec!["mcp".to_string(), "react".to_string()];
        let collections = Collections::index(&[first, second], &[]);

        assert_eq!(
            paths(&collections.tags()["mcp"]),
            vec!["_posts/2026-02-27-react.md", "_posts/2026-02-22-mcp.md"]
        );
        assert_eq!(collections.tags()["react"].len(), 1);

        let (newer, older) = collections.neighbours("_posts/2026-02-22-mcp.md");
        assert_eq!(newer.map(|e| e.path.as_str()), Some("_posts/2026-02-27-react.md"));
        assert!(older.is_none());

        let (newer, older) = collections.neighbours("_posts/2026-02-27-react.md");
        assert!(newer.is_none());
        assert_eq!(older.map(|e| e.path.as_str()), Some("_posts/2026-02-22-mcp.md"));

        assert!(matches!(collections.neighbours("about.md"), (None, None)));
    }

    #[test]
    fn test_paginate_counts() {
        for (total, per_page) in [(0, 3), (1, 3), (3, 3), (7, 3), (9, 3), (2, 1), (10, 10)] {
            let pages = paginate(total, per_page);
            let expected = if total == 0 { 1 } else { total.div_ceil(per_page) };
            assert_eq!(pages.len(), expected, "total={total} per_page={per_page}");

            let last = pages.last().unwrap();
            let expected_last = match (total, total % per_page) {
                (0, _) => 0,
                (_, 0) => per_page,
                (_, rest) => rest,
            };
            assert_eq!(last.range.len(), expected_last);
        }
    }

    #[test]
    fn test_paginate_links() {
        let pages = paginate(2, 1);
        assert_eq!(
            pages,
            vec![
                IndexPage {
                    index: 0,
                    range: 0..1,
                    previous: None,
                    next: Some(1)
                },
                IndexPage {
                    index: 1,
                    range: 1..2,
                    previous: Some(0),
                    next: None
                },
            ]
        );
    }

    #[test]
    fn test_paginate_empty() {
        let pages = paginate(0, 10);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].range.is_empty());
        assert_eq!(pages[0].previous, None);
        assert_eq!(pages[0].next, None);
    }
}
