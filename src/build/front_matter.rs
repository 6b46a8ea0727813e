//! Front matter parsing.
//!
//! Front matter is a YAML block delimited by `---` lines at the very start of
//! a document:
//!
//! ```markdown
//! ---
//! title: My Post
//! date: 2026-02-22
//! tags: [rust, blog]
//! ---
//!
//! # Content starts here
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum FrontMatterError {
    #[error("front matter opened on line 1 but never closed with `---`")]
    Malformed,

    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Front matter metadata parsed from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title (can override filename-derived title)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Publication date, kept as written until `parse_date` is applied
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,
    /// Layout to wrap the rendered body in; `none` disables layouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(
        default,
        alias = "category",
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub categories: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    /// Explicit excerpt (markdown), overriding the separator-based one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    /// Permalink pattern for this document only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    /// `false` keeps the document out of the build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    /// Custom slug override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Collection the document belongs to, overriding its location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    /// Page description for SEO/previews
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional arbitrary metadata, in document order (available in templates
    /// at top level, e.g., `page.author`)
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl FrontMatter {
    /// The layout explicitly named by the document, if any.
    ///
    /// `Some(None)` means the document asked for no layout at all.
    pub fn layout(&self) -> Option<Option<&str>> {
        match self.layout.as_deref() {
            None => None,
            Some("none") | Some("") => Some(None),
            Some(name) => Some(Some(name)),
        }
    }

    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(true)
    }
}

/// Result of parsing front matter from document text.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The body without the front matter block
    pub content: String,
}

/// Returns true if `text` opens with a front matter delimiter.
pub fn has_front_matter(text: &str) -> bool {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.lines()
        .next()
        .is_some_and(|line| line.trim_end() == "---")
}

/// Parse front matter from document text.
///
/// Returns the parsed front matter and the remaining body. A document without
/// an opening `---` line has empty front matter and its whole text as body.
pub fn parse_front_matter(text: &str) -> Result<ParsedContent, FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if !has_front_matter(text) {
        return Ok(ParsedContent {
            front_matter: FrontMatter::default(),
            content: text.to_string(),
        });
    }

    // Byte offset of the start of each line after the opening delimiter
    let yaml_start = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    let mut offset = yaml_start;
    let mut closing = None;
    for line in text[yaml_start..].split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']).trim_end();
        if bare == "---" || bare == "..." {
            closing = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((yaml_end, body_start)) = closing else {
        return Err(FrontMatterError::Malformed);
    };

    let yaml_content = &text[yaml_start..yaml_end];
    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };

    Ok(ParsedContent {
        front_matter,
        content: text[body_start..].to_string(),
    })
}

/// Parse a front matter date.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS +HHMM`, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DD HH:MM` and `YYYY-MM-DD`. Dates with an offset keep the wall
/// clock time of that offset.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Accept any YAML scalar (string, number, bool) as a string.
fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(D::Error::custom("expected a scalar value")),
    }
}

/// Accept either a whitespace-separated string or a list of strings.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    Ok(match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(StringOrList::List(items)) => items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_front_matter_basic() {
        let content = r#"---
title: My Page
description: A test page
---

# Hello World
"#;
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, Some("My Page".to_string()));
        assert_eq!(
            parsed.front_matter.description,
            Some("A test page".to_string())
        );
        assert_eq!(parsed.content.trim(), "# Hello World");
    }

    #[test]
    fn test_parse_front_matter_typed_values() {
        let content = r#"---
title: Typed
date: 2026-02-22
categories: notes rust
tags:
  - mcp
  - react
author: Someone
series: intro
---
Body
"#;
        let parsed = parse_front_matter(content).unwrap();
        let fm = parsed.front_matter;
        assert_eq!(fm.date.as_deref(), Some("2026-02-22"));
        assert_eq!(fm.categories, vec!["notes", "rust"]);
        assert_eq!(fm.tags, vec!["mcp", "react"]);

        // Unknown keys keep their document order
        let keys: Vec<&str> = fm.extra.keys().filter_map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["author", "series"]);
    }

    #[test]
    fn test_parse_front_matter_singular_category() {
        let parsed = parse_front_matter("---\ncategory: journal\n---\n").unwrap();
        assert_eq!(parsed.front_matter.categories, vec!["journal"]);
    }

    #[test]
    fn test_parse_front_matter_numeric_date() {
        let parsed = parse_front_matter("---\ndate: 2026\n---\n").unwrap();
        assert_eq!(parsed.front_matter.date.as_deref(), Some("2026"));
    }

    #[test]
    fn test_parse_front_matter_no_front_matter() {
        let content = "# Just Markdown\n\nNo front matter here.";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.content, content);
    }

    #[test]
    fn test_parse_front_matter_empty_front_matter() {
        let content = "---\n---\n\n# Content";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, None);
        assert_eq!(parsed.content, "\n# Content");
    }

    #[test]
    fn test_parse_front_matter_missing_closing_delimiter() {
        let content = "---\ntitle: Broken\n\n# Never closed\n";
        let err = parse_front_matter(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Malformed));
    }

    #[test]
    fn test_parse_front_matter_invalid_yaml() {
        let content = "---\ntitle: [unclosed\n---\nBody";
        let err = parse_front_matter(content).unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_parse_front_matter_crlf_and_bom() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.front_matter.title, Some("Windows".to_string()));
        assert_eq!(parsed.content, "Body\r\n");
    }

    #[test]
    fn test_horizontal_rule_is_not_a_closing_fence() {
        let content = "---\ntitle: Rule\n---\nabove\n\n---\n\nbelow\n";
        let parsed = parse_front_matter(content).unwrap();
        assert_eq!(parsed.content, "above\n\n---\n\nbelow\n");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = "---\ntitle: Same\ntags: a b\n---\nThe body.\n";
        let first = parse_front_matter(content).unwrap();
        let second = parse_front_matter(content).unwrap();
        assert_eq!(first.content, second.content);
        assert_eq!(first.front_matter.title, second.front_matter.title);
        assert_eq!(first.front_matter.tags, second.front_matter.tags);
        assert_eq!(first.front_matter.extra, second.front_matter.extra);
    }

    #[test]
    fn test_layout_none() {
        let parsed = parse_front_matter("---\nlayout: none\n---\n").unwrap();
        assert_eq!(parsed.front_matter.layout(), Some(None));

        let parsed = parse_front_matter("---\nlayout: post\n---\n").unwrap();
        assert_eq!(parsed.front_matter.layout(), Some(Some("post")));

        assert_eq!(FrontMatter::default().layout(), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date("2026-02-22"), Some(midnight));

        let evening = NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(parse_date("2026-02-22 18:30"), Some(evening));
        assert_eq!(parse_date("2026-02-22 18:30:00"), Some(evening));
        assert_eq!(parse_date("2026-02-22 18:30:00 +0100"), Some(evening));
        assert_eq!(parse_date("2026-02-22T18:30:00+01:00"), Some(evening));

        assert_eq!(parse_date("last tuesday"), None);
        assert_eq!(parse_date("2026"), None);
    }
}
