//! Pipeline context for sharing state across stages.

use std::path::Path;

use crate::build::collection::Collections;
use crate::build::format::FormatRegistry;
use crate::build::layout::LayoutRegistry;
use crate::build::render::{QuillContext, SiteContext};
use crate::config::Config;

/// Shared, read-only context for pipeline stages.
///
/// The render phase runs before collections exist, so `site` and
/// `collections` are only set for the publish phase (see `with_index`).
pub struct PipelineContext<'a> {
    // === Locations ===
    /// Directory documents are read from
    pub site_root: &'a Path,

    /// Directory where output files are written
    pub output_dir: &'a Path,

    // === Configuration ===
    pub config: &'a Config,

    // === Services ===
    /// Content format registry for rendering different file types
    pub formats: &'a FormatRegistry,

    /// Layouts and includes, read-only after load
    pub layouts: &'a LayoutRegistry,

    // === Site-level data (publish phase only) ===
    pub site: Option<&'a SiteContext>,
    pub collections: Option<&'a Collections>,

    // === Mode flags ===
    /// Generator context (dev mode, live reload, version)
    pub quill: QuillContext,
}

impl<'a> PipelineContext<'a> {
    /// Create a context for the render phase.
    pub fn new(
        site_root: &'a Path,
        output_dir: &'a Path,
        config: &'a Config,
        formats: &'a FormatRegistry,
        layouts: &'a LayoutRegistry,
        dev_mode: bool,
        live_reload: bool,
    ) -> Self {
        Self {
            site_root,
            output_dir,
            config,
            formats,
            layouts,
            site: None,
            collections: None,
            quill: QuillContext {
                dev: dev_mode,
                live_reload: dev_mode && live_reload,
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// Attach the site-wide data built at the collection barrier.
    pub fn with_index<'b>(
        self,
        site: &'b SiteContext,
        collections: &'b Collections,
    ) -> PipelineContext<'b>
    where
        'a: 'b,
    {
        PipelineContext {
            site_root: self.site_root,
            output_dir: self.output_dir,
            config: self.config,
            formats: self.formats,
            layouts: self.layouts,
            site: Some(site),
            collections: Some(collections),
            quill: self.quill,
        }
    }
}
