//! File writing stage.
//!
//! Writes the final HTML output to the filesystem.

use std::path::Path;

use crate::build::permalink::url_to_output_path;
use crate::build::pipeline::{PipelineContext, PipelineError, ProcessingDocument, Stage};

/// Stage that writes rendered documents to the output directory.
///
/// This stage takes the final HTML from `doc.output_html` and writes
/// it to the appropriate location in the output directory, creating
/// any necessary parent directories.
pub struct WriteStage;

impl Stage for WriteStage {
    fn name(&self) -> &'static str {
        "write"
    }

    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let html = doc.output_html.as_ref().ok_or_else(|| {
            PipelineError::stage(
                "write",
                format!(
                    "document '{}' has no output HTML (was template stage run?)",
                    doc.url_path()
                ),
            )
        })?;

        write_page(doc.url_path(), html, ctx.output_dir)
    }
}

/// Write `html` to the file `url_path` maps to below `output_dir`.
pub fn write_page(url_path: &str, html: &str, output_dir: &Path) -> Result<(), PipelineError> {
    let output_path = url_to_output_path(url_path, output_dir);

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&output_path, html)?;
    Ok(())
}
