//! Pipeline error types.

use std::path::PathBuf;

use crate::build::format::FormatError;
use crate::build::front_matter::FrontMatterError;
use crate::build::layout::LayoutError;
use crate::build::render::RenderError;

/// Errors that can occur during pipeline processing.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("malformed front matter: {0}")]
    FrontMatter(#[from] FrontMatterError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("template context error: {0}")]
    Render(#[from] RenderError),

    #[error("rendering error: {0}")]
    Format(#[from] FormatError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL {url} leaves the output directory")]
    UnsafeUrl { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}
