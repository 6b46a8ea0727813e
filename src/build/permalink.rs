//! Permalink and output path resolution.
//!
//! This module handles conversions between:
//! - Document metadata (date, slug, categories, source path) and URL paths
//! - URL paths and output file paths (where files are written)

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::document::{Document, DocumentKind};

/// Expand a named permalink style into its pattern.
///
/// Unknown names are returned unchanged, so a custom pattern passes through.
pub fn style_pattern(style: &str) -> &str {
    match style {
        "date" => "/:categories/:year/:month/:day/:title.html",
        "pretty" => "/:categories/:year/:month/:day/:title/",
        "none" => "/:categories/:title.html",
        other => other,
    }
}

/// Values substituted into a permalink pattern.
#[derive(Debug, Default)]
pub struct PermalinkVars<'a> {
    pub date: Option<NaiveDateTime>,
    pub title: &'a str,
    pub categories: &'a [String],
    /// Source path relative to its collection root, without extension
    pub path: &'a str,
    pub collection: &'a str,
}

/// Substitute `:placeholders` in `pattern` and normalize the result.
///
/// The pattern is scanned once, so substituted values are never expanded
/// again. Empty segments collapse, so `/:categories/:title/` without
/// categories becomes `/:title/`, and an undated document loses its date
/// segments. The result always starts with `/`.
pub fn expand(pattern: &str, vars: &PermalinkVars) -> String {
    let categories = vars
        .categories
        .iter()
        .map(|c| slug::slugify(c))
        .collect::<Vec<_>>()
        .join("/");
    let basename = vars.path.rsplit('/').next().unwrap_or(vars.path);
    let date_part = |f: fn(&NaiveDateTime) -> String| vars.date.as_ref().map(f).unwrap_or_default();

    // Longest names first so `:i_month` is not eaten by `:month`
    let placeholders: [(&str, String); 16] = [
        ("short_year", date_part(|d| format!("{:02}", d.year() % 100))),
        ("categories", categories),
        ("collection", vars.collection.to_string()),
        ("output_ext", ".html".to_string()),
        ("basename", basename.to_string()),
        ("i_month", date_part(|d| d.month().to_string())),
        ("minute", date_part(|d| format!("{:02}", d.minute()))),
        ("second", date_part(|d| format!("{:02}", d.second()))),
        ("i_day", date_part(|d| d.day().to_string())),
        ("month", date_part(|d| format!("{:02}", d.month()))),
        ("title", vars.title.to_string()),
        ("year", date_part(|d| format!("{:04}", d.year()))),
        ("hour", date_part(|d| format!("{:02}", d.hour()))),
        ("slug", vars.title.to_string()),
        ("path", vars.path.to_string()),
        ("day", date_part(|d| format!("{:02}", d.day()))),
    ];

    let mut url = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find(':') {
        url.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match placeholders.iter().find(|(name, _)| after.starts_with(name)) {
            Some((name, value)) => {
                url.push_str(value);
                rest = &after[name.len()..];
            }
            None => {
                url.push(':');
                rest = after;
            }
        }
    }
    url.push_str(rest);

    normalize(&url)
}

/// Collapse repeated slashes, drop `.` segments and make sure the URL starts
/// with `/`. `..` segments are kept so `escapes_root` can see them.
fn normalize(url: &str) -> String {
    let trailing = url.ends_with('/');
    let segments: Vec<&str> = url
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let mut out = String::from("/");
    out.push_str(&segments.join("/"));
    if trailing && out.len() > 1 {
        out.push('/');
    }
    out
}

/// Whether a URL climbs above the site root with a `..` segment.
pub fn escapes_root(url: &str) -> bool {
    url.split('/').any(|segment| segment == "..")
}

/// Resolve the URL path for a parsed document.
///
/// A `permalink` in the front matter wins. Otherwise posts use the site's
/// permalink style, pages mirror their source path, and other collections
/// are served under `/<collection>/`.
pub fn document_url(doc: &Document, post_style: &str) -> String {
    let relative = collection_relative_path(doc);

    let (pattern, is_index) = if let Some(permalink) = &doc.front_matter.permalink {
        (permalink.as_str(), false)
    } else if doc.is_post() {
        (style_pattern(post_style), false)
    } else if doc.collection() == "pages" {
        ("/:path/", relative == "index" || relative.ends_with("/index"))
    } else {
        ("/:collection/:path/", false)
    };

    let path = if is_index {
        relative.trim_end_matches("index").trim_end_matches('/')
    } else {
        relative.as_str()
    };

    expand(
        pattern,
        &PermalinkVars {
            date: doc.date,
            title: &doc.slug,
            categories: &doc.front_matter.categories,
            path,
            collection: doc.collection(),
        },
    )
}

/// The document's source path relative to its collection directory, without
/// extension and with `/` separators.
fn collection_relative_path(doc: &Document) -> String {
    let without_ext = doc.source_path.with_extension("");
    let relative = match &doc.kind {
        DocumentKind::Page => without_ext.as_path(),
        _ => {
            let mut components = without_ext.components();
            components.next();
            components.as_path()
        }
    };
    relative.to_string_lossy().replace('\\', "/")
}

/// URL of page `index` (zero-based) of the paginated blog index.
pub fn paginate_url(first_page: &str, path_pattern: &str, index: usize) -> String {
    if index == 0 {
        normalize(first_page)
    } else {
        normalize(&path_pattern.replace(":num", &(index + 1).to_string()))
    }
}

/// Convert a URL path to an output file path.
///
/// URLs ending in `/`, or whose last segment has no extension, become
/// `path/index.html`. Anything else is written to the path as-is.
///
/// # Examples
/// ```ignore
/// url_to_output_path("/2026/02/22/hello/", output_dir) => output_dir/2026/02/22/hello/index.html
/// url_to_output_path("/", output_dir) => output_dir/index.html
/// url_to_output_path("/feed.xml", output_dir) => output_dir/feed.xml
/// ```
pub fn url_to_output_path(url_path: &str, output_dir: &Path) -> PathBuf {
    // `.` and `..` never leave `output_dir`
    let segments: Vec<&str> = url_path
        .split('/')
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .collect();

    let mut path = output_dir.to_path_buf();
    path.extend(&segments);

    let is_file = !url_path.ends_with('/')
        && segments.last().is_some_and(|last| last.contains('.'));
    if !is_file {
        path.push("index.html");
    }
    path
}
