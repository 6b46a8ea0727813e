//! Build pipeline for document processing.
//!
//! Documents pass through three pipelines:
//!
//! - **Parse**: front matter. Resolves metadata so unpublished documents can
//!   be dropped before anything is rendered.
//! - **Render**: markdown → layout. Each published document is rendered to
//!   an HTML fragment and has its layout chain resolved.
//! - **Publish**: template → write, then the `paginate` finalize stage.
//!   Runs once collections and the site context exist.
//!
//! Stages process one document at a time. A document whose stage fails is
//! recorded as a `DocumentFailure` and dropped; the others carry on.
//! Finalize stages run once after all documents and their errors abort the
//! build.

mod context;
mod document;
mod error;
mod stages;

use std::path::PathBuf;

use log::error;

pub use context::PipelineContext;
pub use document::ProcessingDocument;
pub use error::PipelineError;

use stages::{FrontMatterStage, LayoutStage, MarkdownStage, PaginateStage, TemplateStage, WriteStage};

/// A stage in the document processing pipeline.
pub trait Stage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Process one document.
    ///
    /// Documents are passed by mutable reference so stages can transform
    /// their content in place. The `ctx` provides access to shared resources
    /// like the layouts and format registry.
    fn process(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// A stage that runs once after all documents are processed.
pub trait FinalizeStage: Send + Sync {
    /// Unique name for this stage.
    fn name(&self) -> &'static str;

    /// Run finalization over the documents that made it through.
    fn finalize(
        &self,
        docs: &[ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError>;
}

/// A document that failed a stage and was left out of the build.
#[derive(Debug)]
pub struct DocumentFailure {
    /// Source path relative to the site root
    pub path: PathBuf,
    /// Name of the stage that failed
    pub stage: &'static str,
    pub error: PipelineError,
}

/// The document processing pipeline.
pub struct Pipeline {
    /// Per-document stages
    stages: Vec<Box<dyn Stage>>,
    /// Build-wide stages (run once after all documents)
    finalize_stages: Vec<Box<dyn FinalizeStage>>,
}

impl Pipeline {
    /// Create an empty pipeline with no stages.
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            finalize_stages: Vec::new(),
        }
    }

    /// Metadata only: front_matter
    pub fn parse_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(FrontMatterStage);
        pipeline
    }

    /// Stages run before the collection barrier: markdown → layout
    pub fn render_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(MarkdownStage);
        pipeline.add_stage(LayoutStage);
        pipeline
    }

    /// Stages run after the collection barrier: template → write, then paginate
    pub fn publish_pipeline() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(TemplateStage);
        pipeline.add_stage(WriteStage);
        pipeline.add_finalize_stage(PaginateStage);
        pipeline
    }

    /// Add a stage to the end of the pipeline.
    pub fn add_stage<S: Stage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a finalize stage (runs after all documents are processed).
    pub fn add_finalize_stage<S: FinalizeStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.finalize_stages.push(Box::new(stage));
        self
    }

    /// Run the pipeline on a set of documents.
    ///
    /// Failed documents are removed from `docs` and returned. An `Err` means
    /// a finalize stage failed.
    pub fn run(
        &self,
        docs: &mut Vec<ProcessingDocument>,
        ctx: &PipelineContext,
    ) -> Result<Vec<DocumentFailure>, PipelineError> {
        let mut failures = Vec::new();

        docs.retain_mut(|doc| match self.process_one(doc, ctx) {
            Ok(()) => true,
            Err((stage, err)) => {
                error!("{}: {}", doc.doc.source_path.display(), err);
                failures.push(DocumentFailure {
                    path: doc.doc.source_path.clone(),
                    stage,
                    error: err,
                });
                false
            }
        });

        for stage in &self.finalize_stages {
            if let Err(err) = stage.finalize(docs, ctx) {
                error!("{} failed: {}", stage.name(), err);
                return Err(err);
            }
        }

        Ok(failures)
    }

    fn process_one(
        &self,
        doc: &mut ProcessingDocument,
        ctx: &PipelineContext,
    ) -> Result<(), (&'static str, PipelineError)> {
        for stage in &self.stages {
            stage.process(doc, ctx).map_err(|e| (stage.name(), e))?;
        }
        Ok(())
    }

    /// Get the names of all stages in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
