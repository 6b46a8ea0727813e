//! Markdown rendering with heading ids, TOC extraction and asset references.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use super::render::TocEntry;
use crate::config::MarkdownConfig;

#[derive(thiserror::Error, Debug)]
pub enum MarkdownError {
    #[error("invalid markdown extension: {0}")]
    InvalidExtension(String),
}

/// Result of rendering markdown.
pub struct MarkdownOutput {
    pub html: String,
    pub toc: Vec<TocEntry>,
    /// Root-relative link and image destinations, in document order
    pub assets: Vec<String>,
}

/// Build pulldown-cmark options from the configured extension names.
pub fn markdown_options(markdown_config: &MarkdownConfig) -> Result<Options, MarkdownError> {
    let mut options = Options::empty();
    for extension in &markdown_config.extensions {
        match extension.as_str() {
            "definition_lists" => options.insert(Options::ENABLE_DEFINITION_LIST),
            "footnotes" => options.insert(Options::ENABLE_FOOTNOTES),
            "gfm" => options.insert(Options::ENABLE_GFM),
            "heading_attributes" => options.insert(Options::ENABLE_HEADING_ATTRIBUTES),
            "strikethrough" => options.insert(Options::ENABLE_STRIKETHROUGH),
            "tables" => options.insert(Options::ENABLE_TABLES),
            "tasklists" => options.insert(Options::ENABLE_TASKLISTS),
            other => return Err(MarkdownError::InvalidExtension(other.to_string())),
        }
    }
    Ok(options)
}

/// Render markdown to HTML using pulldown-cmark.
pub fn render_markdown(
    markdown: &str,
    markdown_config: &MarkdownConfig,
) -> Result<MarkdownOutput, MarkdownError> {
    let options = markdown_options(markdown_config)?;
    let parser = Parser::new_ext(markdown, options);

    // Headings are buffered so an id can be generated from their text
    struct HeadingState<'a> {
        level: HeadingLevel,
        id: Option<String>,
        classes: Vec<String>,
        attrs: Vec<(String, Option<String>)>,
        text: String,
        inner: Vec<Event<'a>>,
    }
    let mut in_heading: Option<HeadingState> = None;
    let mut used_heading_ids: HashSet<String> = HashSet::new();
    let mut toc_entries: Vec<TocEntry> = Vec::new();
    let mut assets: Vec<String> = Vec::new();

    let mut events: Vec<Event> = Vec::new();
    for event in parser {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                in_heading = Some(HeadingState {
                    level,
                    id: id.map(|id| id.to_string()),
                    classes: classes.iter().map(|c| c.to_string()).collect(),
                    attrs: attrs
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.as_ref().map(|v| v.to_string())))
                        .collect(),
                    text: String::new(),
                    inner: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                let Some(state) = in_heading.take() else {
                    continue;
                };

                let id = match state.id {
                    Some(id) => id,
                    None => unique_id(&slugify(&state.text), &used_heading_ids),
                };
                used_heading_ids.insert(id.clone());

                toc_entries.push(TocEntry {
                    text: state.text.clone(),
                    id: id.clone(),
                    level: state.level as u8,
                });

                let class_attr = if state.classes.is_empty() {
                    String::new()
                } else {
                    format!(" class=\"{}\"", state.classes.join(" "))
                };
                let extra_attrs = state
                    .attrs
                    .iter()
                    .map(|(k, v)| match v {
                        Some(val) => format!(" {}=\"{}\"", k, val),
                        None => format!(" {}", k),
                    })
                    .collect::<String>();

                let mut inner_html = String::new();
                html::push_html(&mut inner_html, state.inner.into_iter());

                events.push(Event::Html(
                    format!(
                        "<h{level} id=\"{id}\"{class_attr}{extra_attrs}>{inner_html}</h{level}>\n",
                        level = state.level as usize,
                    )
                    .into(),
                ));
            }
            event => {
                if let Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) =
                    &event
                    && let Some(asset) = asset_reference(dest_url)
                {
                    assets.push(asset);
                }

                match in_heading.as_mut() {
                    Some(state) => {
                        if let Event::Text(text) | Event::Code(text) = &event {
                            state.text.push_str(text);
                        }
                        state.inner.push(event);
                    }
                    None => events.push(event),
                }
            }
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    Ok(MarkdownOutput {
        html: html_output,
        toc: toc_entries,
        assets,
    })
}

/// A root-relative destination that should exist in the output tree.
///
/// External URLs, protocol-relative URLs and in-page anchors are not assets.
/// Query strings and fragments are stripped.
fn asset_reference(dest: &CowStr) -> Option<String> {
    if !dest.starts_with('/') || dest.starts_with("//") {
        return None;
    }
    let path = dest.split(['?', '#']).next().unwrap_or("");
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn unique_id(base_id: &str, used: &HashSet<String>) -> String {
    let mut id = base_id.to_string();
    let mut suffix = 1;
    while used.contains(&id) {
        id = format!("{}-{}", base_id, suffix);
        suffix += 1;
    }
    id
}

/// Convert heading text to a slug suitable for use as an HTML id.
fn slugify(s: &str) -> String {
    let id = slug::slugify(s);
    if id.is_empty() {
        "section".to_string()
    } else {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "what-s-new");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("???"), "section");
    }

    #[test]
    fn test_render_basic_markdown() {
        let config = MarkdownConfig::default();

        let output = render_markdown("# Hello\n\nWorld", &config).unwrap();

        assert!(output.html.contains("<h1 id=\"hello\">Hello</h1>"));
        assert!(output.html.contains("<p>World</p>"));
        assert_eq!(output.toc.len(), 1);
        assert_eq!(output.toc[0].text, "Hello");
        assert_eq!(output.toc[0].level, 1);
    }

    #[test]
    fn test_heading_keeps_inline_markup() {
        let config = MarkdownConfig::default();

        let output = render_markdown("## Using `serde` *well*", &config).unwrap();

        assert!(output.html.contains(
            "<h2 id=\"using-serde-well\">Using <code>serde</code> <em>well</em></h2>"
        ));
        assert_eq!(output.toc[0].text, "Using serde well");
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let config = MarkdownConfig::default();

        let output = render_markdown("## Setup\n\n## Setup\n\n## Setup", &config).unwrap();

        let ids: Vec<&str> = output.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["setup", "setup-1", "setup-2"]);
    }

    #[test]
    fn test_explicit_heading_id() {
        let config = MarkdownConfig::default();

        let output = render_markdown("## Intro {#start}", &config).unwrap();

        assert!(output.html.contains("<h2 id=\"start\">Intro</h2>"));
        assert_eq!(output.toc[0].id, "start");
    }

    #[test]
    fn test_render_code_block() {
        let config = MarkdownConfig::default();

        let output = render_markdown("```rust\nlet x = 1;\n```", &config).unwrap();

        assert!(output.html.contains("<pre><code class=\"language-rust\">"));
        assert!(output.html.contains("let x = 1;"));
    }

    #[test]
    fn test_collects_root_relative_assets() {
        let config = MarkdownConfig::default();
        let markdown = "![diagram](/assets/img/mcp.png)\n\n\
                        [style](/assets/site.css?v=2) [ext](https://example.com/x.png) \
                        [anchor](#top) [proto](//cdn.example.com/a.js) [rel](images/a.png)";

        let output = render_markdown(markdown, &config).unwrap();

        assert_eq!(
            output.assets,
            vec!["/assets/img/mcp.png", "/assets/site.css"]
        );
    }

    #[test]
    fn test_invalid_extension() {
        let config = MarkdownConfig {
            extensions: vec!["not_a_real_extension".to_string()],
        };

        let result = render_markdown("# Test", &config);
        assert!(result.is_err());
    }
}
