//! Front matter stage.
//!
//! Reads the source file, splits off its front matter and resolves the
//! document's date, slug and URL.

use chrono::{DateTime, Local, NaiveDateTime};
use log::warn;

use crate::build::document::{Document, DocumentKind};
use crate::build::front_matter::{parse_date, parse_front_matter};
use crate::build::permalink::{document_url, escapes_root};
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that parses front matter and derives date, slug and URL.
///
/// After this stage, `doc.content` holds the raw body and `doc.doc` carries
/// its metadata and `url_path`.
pub struct FrontMatterStage;

impl Stage for FrontMatterStage {
    fn name(&self) -> &'static str {
        "front_matter"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let path = ctx.site_root.join(&doc.doc.source_path);
        let text = std::fs::read_to_string(&path).map_err(|source| PipelineError::Read {
            path: doc.doc.source_path.clone(),
            source,
        })?;

        let parsed = parse_front_matter(&text)?;
        doc.doc.front_matter = parsed.front_matter;
        doc.content = parsed.content;

        doc.doc.date = resolve_date(&doc.doc, &path);
        if let Some(slug) = &doc.doc.front_matter.slug {
            doc.doc.slug = slug.clone();
        }
        let url = document_url(&doc.doc, &ctx.config.content.permalink);
        if escapes_root(&url) {
            return Err(PipelineError::UnsafeUrl { url });
        }
        doc.doc.url_path = url;

        Ok(())
    }
}

/// Front matter date, then file name date, then (for drafts) the file's
/// modification time.
fn resolve_date(doc: &Document, path: &std::path::Path) -> Option<NaiveDateTime> {
    if let Some(raw) = &doc.front_matter.date {
        match parse_date(raw) {
            Some(date) => return Some(date),
            None => warn!(
                "{}: unrecognised date '{}'",
                doc.source_path.display(),
                raw
            ),
        }
    }

    if let Some(date) = doc.file_name_date() {
        return Some(date);
    }

    if doc.kind == DocumentKind::Draft {
        return std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(|modified| DateTime::<Local>::from(modified).naive_local());
    }

    None
}
