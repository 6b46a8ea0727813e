use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::front_matter::FrontMatter;

// =============================================================================
// Content items (documents and static files)
// =============================================================================

/// A content item discovered under the site root.
/// Can be either a document (rendered to HTML) or a static file (copied).
#[derive(Debug, Clone)]
pub enum ContentItem {
    /// A document that will be rendered to HTML
    Document(Document),
    /// A static file that will be copied as-is
    Static(StaticFile),
}

impl ContentItem {
    /// Get the path relative to the site root.
    pub fn source_path(&self) -> &Path {
        match self {
            ContentItem::Document(doc) => &doc.source_path,
            ContentItem::Static(file) => &file.source_path,
        }
    }
}

// =============================================================================
// Static files
// =============================================================================

/// A static file (image, CSS, JS, etc.) that gets copied to output.
#[derive(Debug, Clone)]
pub struct StaticFile {
    /// Path relative to the site root (e.g., "assets/css/style.css")
    pub source_path: PathBuf,
}

impl StaticFile {
    pub fn new(source_path: PathBuf) -> Self {
        Self { source_path }
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Where a document came from, which decides its default collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKind {
    /// A dated post from `_posts/`
    Post,
    /// An unpublished post from `_drafts/`
    Draft,
    /// A document in a configured `_<name>/` collection directory
    Collection(String),
    /// Any other document
    Page,
}

/// A document flowing through the build pipeline.
///
/// Documents progress through stages:
/// 1. Discovered: file path known, content not yet read
/// 2. Parsed: front matter extracted, date, slug and URL resolved
/// 3. Rendered: HTML body generated
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the site root (e.g., "_posts/2026-02-22-hello.md")
    pub source_path: PathBuf,
    /// Where the document was found
    pub kind: DocumentKind,
    /// Front matter metadata
    pub front_matter: FrontMatter,
    /// Publication date (front matter, then file name, then mtime for drafts)
    pub date: Option<NaiveDateTime>,
    /// URL slug (front matter, then file name)
    pub slug: String,
    /// The URL path this document will be served at (e.g., "/2026/02/22/hello/")
    pub url_path: String,
}

impl Document {
    /// Create a new discovered document (content not yet loaded).
    pub fn discovered(source_path: PathBuf, kind: DocumentKind) -> Self {
        let (_, slug) = split_file_name(&source_path);
        Self {
            source_path,
            kind,
            front_matter: FrontMatter::default(),
            date: None,
            slug,
            url_path: String::new(),
        }
    }

    /// Get the document title, falling back to the slug if not in front matter.
    pub fn title(&self) -> String {
        self.front_matter
            .title
            .clone()
            .unwrap_or_else(|| title_from_slug(&self.slug))
    }

    /// Name of the collection this document belongs to.
    pub fn collection(&self) -> &str {
        if let Some(name) = &self.front_matter.collection {
            return name;
        }
        match &self.kind {
            DocumentKind::Post | DocumentKind::Draft => "posts",
            DocumentKind::Collection(name) => name,
            DocumentKind::Page => "pages",
        }
    }

    pub fn is_post(&self) -> bool {
        self.collection() == "posts"
    }

    /// Date from the file name, if it follows the `YYYY-MM-DD-slug` convention.
    pub fn file_name_date(&self) -> Option<NaiveDateTime> {
        split_file_name(&self.source_path).0
    }
}

/// Split a post file name like `2026-02-22-hello-world.md` into its date and
/// slug. Names without a date prefix yield just the stem as slug.
pub fn split_file_name(path: &Path) -> (Option<NaiveDateTime>, String) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    if stem.len() > 11 && stem.as_bytes()[10] == b'-' {
        if let Some(prefix) = stem.get(..10)
            && let Ok(date) = chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        {
            return (date.and_hms_opt(0, 0, 0), stem[11..].to_string());
        }
    }

    (None, stem.to_string())
}

/// Words kept lowercase in a derived title unless they open it.
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "of", "on", "or", "the", "to", "vs",
];

/// Title for a document without one in its front matter.
///
/// `2026-02-27-react-and-mcp` has slug `react-and-mcp`, which reads as
/// "React and Mcp". Words already containing capitals are left alone.
fn title_from_slug(slug: &str) -> String {
    let mut title = String::with_capacity(slug.len());
    for (i, word) in slug.split(['-', '_']).filter(|w| !w.is_empty()).enumerate() {
        if i > 0 {
            title.push(' ');
        }
        if i > 0 && MINOR_WORDS.contains(&word) {
            title.push_str(word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            title.extend(first.to_uppercase());
            title.push_str(chars.as_str());
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_title_fallback() {
        let doc = Document::discovered(
            PathBuf::from("_posts/2026-02-22-getting-started.md"),
            DocumentKind::Post,
        );
        assert_eq!(doc.title(), "Getting Started");
    }

    #[test]
    fn test_title_from_slug() {
        assert_eq!(title_from_slug("react-and-mcp"), "React and Mcp");
        assert_eq!(title_from_slug("the-state-of-rust"), "The State of Rust");
        assert_eq!(title_from_slug("api_reference"), "Api Reference");
        assert_eq!(title_from_slug("README"), "README");
        assert_eq!(title_from_slug("notes--draft-"), "Notes Draft");
        assert_eq!(title_from_slug(""), "");
    }

    #[test]
    fn test_document_title_from_front_matter() {
        let mut doc = Document::discovered(PathBuf::from("about.md"), DocumentKind::Page);
        doc.front_matter.title = Some("About Me".to_string());
        assert_eq!(doc.title(), "About Me");
    }

    #[test]
    fn test_split_file_name() {
        let (date, slug) = split_file_name(Path::new("_posts/2026-02-27-react-and-mcp.md"));
        assert_eq!(
            date,
            chrono::NaiveDate::from_ymd_opt(2026, 2, 27).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(slug, "react-and-mcp");

        let (date, slug) = split_file_name(Path::new("about.md"));
        assert_eq!(date, None);
        assert_eq!(slug, "about");

        let (date, slug) = split_file_name(Path::new("_posts/2026-13-40-bad-date.md"));
        assert_eq!(date, None);
        assert_eq!(slug, "2026-13-40-bad-date");
    }

    #[test]
    fn test_collection_membership() {
        let post = Document::discovered(PathBuf::from("_posts/a.md"), DocumentKind::Post);
        assert_eq!(post.collection(), "posts");
        assert!(post.is_post());

        let draft = Document::discovered(PathBuf::from("_drafts/a.md"), DocumentKind::Draft);
        assert_eq!(draft.collection(), "posts");

        let mut page = Document::discovered(PathBuf::from("notes/a.md"), DocumentKind::Page);
        assert_eq!(page.collection(), "pages");
        page.front_matter.collection = Some("posts".to_string());
        assert!(page.is_post());

        let recipe = Document::discovered(
            PathBuf::from("_recipes/soup.md"),
            DocumentKind::Collection("recipes".to_string()),
        );
        assert_eq!(recipe.collection(), "recipes");
    }
}
