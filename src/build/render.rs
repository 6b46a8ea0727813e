use std::collections::BTreeMap;

use serde::Serialize;
use tera::{Context, Tera};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

/// The template renderer, wrapping Tera.
///
/// Templates are registered from strings rather than a glob, since layouts
/// carry their own front matter that has to be stripped first.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Create an empty renderer.
    ///
    /// Autoescaping is off: layouts receive already-rendered HTML as `content`.
    pub fn new() -> Self {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        Self { tera }
    }

    /// Register a batch of named templates.
    ///
    /// Templates may include or extend each other in any order within the batch.
    pub fn add_templates<I, N, C>(&mut self, templates: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        self.tera.add_raw_templates(templates)?;
        Ok(())
    }

    /// Render a registered template.
    pub fn render(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        Ok(self.tera.render(name, context)?)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a layout sees while rendering one output page.
///
/// `content` and `layout` are added per layout during composition.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub site: &'a SiteContext,
    pub page: &'a PageInfo,
    /// Table of contents for the current page
    pub toc: &'a [TocEntry],
    /// Only set on blog index pages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<&'a PaginatorContext>,
    pub quill: &'a QuillContext,
}

impl PageContext<'_> {
    pub fn to_tera(&self) -> Result<Context, RenderError> {
        Ok(Context::from_serialize(self)?)
    }
}

/// Site-level information, shared by every page of one build.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub url: Option<String>,
    pub baseurl: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Build time, RFC 3339
    pub time: String,
    /// Published posts, newest first
    pub posts: Vec<EntrySummary>,
    /// Pages, by source path
    pub pages: Vec<EntrySummary>,
    /// Every collection by name, including `posts` and `pages`
    pub collections: BTreeMap<String, Vec<EntrySummary>>,
    pub tags: BTreeMap<String, Vec<EntrySummary>>,
    pub categories: BTreeMap<String, Vec<EntrySummary>>,
    /// Any other keys from the `site` config section
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// A document as it appears in listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntrySummary {
    pub title: String,
    pub url: String,
    /// `YYYY-MM-DDTHH:MM:SS`, usable with Tera's `date` filter
    pub date: Option<String>,
    /// Rendered HTML excerpt
    pub excerpt: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub collection: String,
    /// Source path relative to the site root
    pub path: String,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

/// Information about the current page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageInfo {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub excerpt: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub collection: String,
    pub path: String,
    /// Newer post, for posts only
    pub next: Option<EntrySummary>,
    /// Older post, for posts only
    pub previous: Option<EntrySummary>,
    /// Custom front matter fields (flattened to top level, e.g., `page.author`)
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl PageInfo {
    /// Page info for a listing entry, with no neighbours.
    pub fn from_summary(summary: &EntrySummary) -> Self {
        Self {
            title: summary.title.clone(),
            url: summary.url.clone(),
            date: summary.date.clone(),
            excerpt: summary.excerpt.clone(),
            description: summary.description.clone(),
            tags: summary.tags.clone(),
            categories: summary.categories.clone(),
            collection: summary.collection.clone(),
            path: summary.path.clone(),
            next: None,
            previous: None,
            extra: summary.extra.clone(),
        }
    }
}

/// One page of the paginated blog index.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatorContext {
    /// 1-based number of this page
    pub page: usize,
    pub per_page: usize,
    pub total_posts: usize,
    pub total_pages: usize,
    pub posts: Vec<EntrySummary>,
    pub previous_page: Option<usize>,
    pub previous_page_path: Option<String>,
    pub next_page: Option<usize>,
    pub next_page_path: Option<String>,
}

/// Generator information, accessible as `quill.*` in templates.
#[derive(Debug, Clone, Serialize)]
pub struct QuillContext {
    /// Whether we're in dev mode (`quill serve`)
    pub dev: bool,
    /// Whether live reload is enabled
    pub live_reload: bool,
    pub version: String,
}

/// A table of contents entry for the current page.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// The heading text
    pub text: String,
    /// The heading id (for anchor links)
    pub id: String,
    /// The heading level (1-6)
    pub level: u8,
}
