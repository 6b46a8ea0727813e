//! Content rendering stage.
//!
//! Renders document content to HTML using the appropriate format
//! from the format registry.

use crate::build::format::FormatContext;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that renders the body and excerpt to HTML.
///
/// This stage:
/// - Looks up the appropriate format based on file extension
/// - Renders content to HTML, extracting headings and asset references
/// - Renders the excerpt: the `excerpt` front matter key if set, otherwise
///   the body up to the first excerpt separator
///
/// The body is rendered exactly once per build.
pub struct MarkdownStage;

impl Stage for MarkdownStage {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let format_ctx = FormatContext {
            markdown_config: &ctx.config.markdown,
        };
        let path = doc.doc.source_path.clone();

        let excerpt_source = match &doc.doc.front_matter.excerpt {
            Some(excerpt) => excerpt.clone(),
            None => excerpt_of(&doc.content, &ctx.config.content.excerpt_separator),
        };
        let excerpt = ctx.formats.render(&path, &excerpt_source, &format_ctx)?;

        let output = ctx.formats.render(&path, &doc.content, &format_ctx)?;
        doc.content = output.html;
        doc.toc = output.toc;
        doc.assets = output.assets;
        doc.excerpt = excerpt.html;

        Ok(())
    }
}

/// The part of `body` before the first `separator`, ignoring leading blank
/// lines. The whole body when there is no separator.
///
/// Line endings are compared as `\n`, so CRLF files split the same way.
fn excerpt_of(body: &str, separator: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let separator = separator.replace("\r\n", "\n");
    let body = body.trim_start_matches('\n');
    if separator.is_empty() {
        return body.to_string();
    }
    match body.find(&separator) {
        Some(end) => body[..end].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_stops_at_first_separator() {
        let body = "\nFirst paragraph.\n\nSecond paragraph.\n";
        assert_eq!(excerpt_of(body, "\n\n"), "First paragraph.");
        assert_eq!(excerpt_of(body, "<!--more-->"), "First paragraph.\n\nSecond paragraph.\n");
        assert_eq!(
            excerpt_of("Intro\n<!--more-->\nRest", "<!--more-->"),
            "Intro\n"
        );
        assert_eq!(excerpt_of("All of it", ""), "All of it");
    }

    #[test]
    fn test_excerpt_with_crlf_line_endings() {
        let body = "\r\nFirst paragraph.\r\n\r\nSecond paragraph.\r\n";
        assert_eq!(excerpt_of(body, "\n\n"), "First paragraph.");
        assert_eq!(excerpt_of(body, "\r\n\r\n"), "First paragraph.");
        assert_eq!(
            excerpt_of("Intro\r\n<!--more-->\r\nRest", "<!--more-->"),
            "Intro\n"
        );
    }
}
