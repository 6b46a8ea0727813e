//! Default pipeline stages.
//!
//! Render phase:
//!
//! 1. **FrontMatterStage** - Read the file, parse front matter, resolve date, slug and URL
//! 2. **MarkdownStage** - Render the body and excerpt to HTML
//! 3. **LayoutStage** - Resolve the layout chain
//!
//! Publish phase:
//!
//! 4. **TemplateStage** - Compose the layouts around the body
//! 5. **WriteStage** - Write final HTML to the output directory
//! 6. **PaginateStage** (finalize) - Write the paginated blog index

mod front_matter;
mod layout;
mod markdown;
mod paginate;
mod template;
mod write;

pub use front_matter::FrontMatterStage;
pub use layout::LayoutStage;
pub use markdown::MarkdownStage;
pub use paginate::PaginateStage;
pub use template::TemplateStage;
pub use write::WriteStage;
