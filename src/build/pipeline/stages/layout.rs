//! Layout resolution stage.

use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that resolves the chain of layouts a document is wrapped in.
///
/// Runs before the collection barrier so that a document naming an unknown
/// layout, or a layout cycle, never shows up in any listing.
pub struct LayoutStage;

impl Stage for LayoutStage {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let content = &ctx.config.content;
        let name = match doc.doc.front_matter.layout() {
            Some(None) => None,
            Some(Some(name)) => Some(name),
            None if doc.doc.is_post() => Some(
                content
                    .post_layout
                    .as_deref()
                    .unwrap_or(&content.default_layout),
            ),
            None => Some(content.default_layout.as_str()),
        };

        doc.layout_chain = match name {
            Some(name) => ctx.layouts.resolve_chain(name)?,
            None => Vec::new(),
        };

        Ok(())
    }
}
