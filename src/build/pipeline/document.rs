//! Document types for pipeline processing.

use crate::build::document::Document;
use crate::build::render::TocEntry;

/// A document being processed through the pipeline.
///
/// Wraps the discovered `Document` with state that evolves through the
/// stages:
///
/// 1. Initially: only the source path and kind are known
/// 2. After front matter: `doc` is parsed, `content` = raw body
/// 3. After markdown: `content` = HTML, `excerpt`, `toc` and `assets` populated
/// 4. After layout: `layout_chain` resolved
/// 5. After template: `output_html` = final page HTML
#[derive(Debug)]
pub struct ProcessingDocument {
    /// The document metadata
    pub doc: Document,

    /// Body being processed: raw text, then an HTML fragment.
    pub content: String,

    /// Rendered excerpt (HTML)
    pub excerpt: String,

    /// Table of contents extracted during rendering.
    pub toc: Vec<TocEntry>,

    /// Root-relative asset references found while rendering.
    pub assets: Vec<String>,

    /// Layouts to wrap the body in, innermost first. Empty for no layout.
    pub layout_chain: Vec<String>,

    /// Final HTML output after composition.
    ///
    /// None until the template stage populates it.
    pub output_html: Option<String>,
}

impl ProcessingDocument {
    /// Create a new processing document from a discovered document.
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            content: String::new(),
            excerpt: String::new(),
            toc: Vec::new(),
            assets: Vec::new(),
            layout_chain: Vec::new(),
            output_html: None,
        }
    }

    /// Get the document's URL path (for output location).
    pub fn url_path(&self) -> &str {
        &self.doc.url_path
    }

    /// Source path as a `/`-separated string, used to key documents.
    pub fn source_key(&self) -> String {
        self.doc.source_path.to_string_lossy().replace('\\', "/")
    }
}
