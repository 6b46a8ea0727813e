//! Layout composition stage.
//!
//! Wraps rendered HTML content in the document's layout chain.

use crate::build::collection::summarize;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};
use crate::build::render::{PageContext, PageInfo};

/// Stage that applies the layout chain to rendered content.
///
/// Each layout sees `site`, `page`, `toc`, `quill`, its own front matter as
/// `layout`, and the content so far as `content`. Posts also get their
/// neighbours as `page.next` and `page.previous`.
///
/// After this stage, `doc.output_html` contains the complete HTML page.
pub struct TemplateStage;

impl Stage for TemplateStage {
    fn name(&self) -> &'static str {
        "template"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let (Some(site), Some(collections)) = (ctx.site, ctx.collections) else {
            return Err(PipelineError::stage(
                "template",
                "site context is not available before indexing",
            ));
        };

        let mut page = PageInfo::from_summary(&summarize(doc));
        if doc.doc.is_post() {
            let (newer, older) = collections.neighbours(&doc.source_key());
            page.next = newer.cloned();
            page.previous = older.cloned();
        }

        let context = PageContext {
            site,
            page: &page,
            toc: &doc.toc,
            paginator: None,
            quill: &ctx.quill,
        }
        .to_tera()?;

        let html = ctx
            .layouts
            .compose(&doc.layout_chain, doc.content.clone(), &context)?;

        doc.output_html = Some(html);
        Ok(())
    }
}
