//! Pluggable content format system.
//!
//! This module provides a registry of content formats that can render
//! different file types to HTML. Markdown is the main format; HTML documents
//! with front matter pass through unchanged so they can still use layouts.
//!
//! # Adding a New Format
//!
//! ```ignore
//! struct TextileFormat;
//!
//! impl ContentFormat for TextileFormat {
//!     fn name(&self) -> &'static str { "textile" }
//!     fn extensions(&self) -> &[&'static str] { &["textile"] }
//!     fn render(&self, content: &str, ctx: &FormatContext) -> Result<FormatOutput, FormatError> {
//!         // Convert Textile to HTML...
//!     }
//! }
//!
//! registry.register(TextileFormat);
//! ```

use std::path::Path;

use log::debug;

use crate::build::markdown::render_markdown;
use crate::build::render::TocEntry;
use crate::config::MarkdownConfig;

/// Output from rendering a content format.
#[derive(Debug, Clone, Default)]
pub struct FormatOutput {
    /// The rendered HTML content.
    pub html: String,
    /// Table of contents extracted from headings.
    pub toc: Vec<TocEntry>,
    /// Root-relative asset references found in the content.
    pub assets: Vec<String>,
}

/// Context available during format rendering.
pub struct FormatContext<'a> {
    pub markdown_config: &'a MarkdownConfig,
}

/// Error during format rendering.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("no format registered for extension: {0}")]
    UnknownExtension(String),

    #[error("markdown error: {0}")]
    Markdown(#[from] crate::build::markdown::MarkdownError),
}

/// A content format that can render files to HTML.
pub trait ContentFormat: Send + Sync {
    /// The name of this format (e.g., "markdown").
    fn name(&self) -> &'static str;

    /// File extensions this format handles (lowercase, without dot).
    fn extensions(&self) -> &[&'static str];

    /// Whether a file of this format is only a document when it has front
    /// matter. Such files are copied as static assets otherwise.
    fn requires_front_matter(&self) -> bool {
        false
    }

    /// Render content to HTML.
    fn render(&self, content: &str, ctx: &FormatContext) -> Result<FormatOutput, FormatError>;
}

/// Markdown format implementation, backed by pulldown-cmark.
pub struct MarkdownFormat;

impl ContentFormat for MarkdownFormat {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extensions(&self) -> &[&'static str] {
        &["md", "markdown"]
    }

    fn render(&self, content: &str, ctx: &FormatContext) -> Result<FormatOutput, FormatError> {
        let output = render_markdown(content, ctx.markdown_config)?;
        Ok(FormatOutput {
            html: output.html,
            toc: output.toc,
            assets: output.assets,
        })
    }
}

/// HTML documents: the body is already HTML and is used as-is.
pub struct HtmlFormat;

impl ContentFormat for HtmlFormat {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extensions(&self) -> &[&'static str] {
        &["html", "htm"]
    }

    fn requires_front_matter(&self) -> bool {
        true
    }

    fn render(&self, content: &str, _ctx: &FormatContext) -> Result<FormatOutput, FormatError> {
        Ok(FormatOutput {
            html: content.to_string(),
            ..Default::default()
        })
    }
}

/// Registry of content formats.
///
/// The registry determines which format to use based on file extension.
pub struct FormatRegistry {
    formats: Vec<Box<dyn ContentFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Create a registry with the default formats (Markdown, HTML).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlFormat);
        registry.register(MarkdownFormat);
        registry
    }

    /// Register a new format.
    ///
    /// Later registrations take precedence for overlapping extensions.
    pub fn register<F: ContentFormat + 'static>(&mut self, format: F) {
        self.formats.push(Box::new(format));
    }

    /// Find the format for a file extension.
    pub fn for_extension(&self, ext: &str) -> Option<&dyn ContentFormat> {
        let ext_lower = ext.to_lowercase();
        // Search in reverse so later registrations take precedence
        self.formats
            .iter()
            .rev()
            .find(|f| f.extensions().iter().any(|e| *e == ext_lower))
            .map(|f| f.as_ref())
    }

    /// Find the format for a file path based on its extension.
    pub fn for_path(&self, path: &Path) -> Option<&dyn ContentFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.for_extension(ext))
    }

    /// Render `content` with the format registered for `path`.
    pub fn render(
        &self,
        path: &Path,
        content: &str,
        ctx: &FormatContext,
    ) -> Result<FormatOutput, FormatError> {
        let format = self.for_path(path).ok_or_else(|| {
            FormatError::UnknownExtension(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("(none)")
                    .to_string(),
            )
        })?;
        debug!("rendering {} as {}", path.display(), format.name());
        format.render(content, ctx)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
