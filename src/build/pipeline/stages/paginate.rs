//! Blog index stage.
//!
//! Writes the posts collection as a sequence of fixed-size index pages.

use log::debug;

use super::write::write_page;
use crate::build::collection::paginate;
use crate::build::permalink::paginate_url;
use crate::build::pipeline::{FinalizeStage, PipelineContext, PipelineError, ProcessingDocument};
use crate::build::render::{PageContext, PageInfo, PaginatorContext};

/// Finalize stage that renders the paginated blog index.
///
/// Each index page is rendered through the `paginate.layout` chain with a
/// `paginator` in its context. Without a `paginate` config section this
/// stage does nothing.
///
/// When `paginate.home` is set and no document claimed `/`, the first index
/// page is also written as the home page.
pub struct PaginateStage;

impl FinalizeStage for PaginateStage {
    fn name(&self) -> &'static str {
        "paginate"
    }

    fn finalize(
        &self,
        docs: &[ProcessingDocument],
        ctx: &PipelineContext,
    ) -> Result<(), PipelineError> {
        let Some(config) = &ctx.config.paginate else {
            return Ok(());
        };
        let (Some(site), Some(collections)) = (ctx.site, ctx.collections) else {
            return Err(PipelineError::stage(
                "paginate",
                "site context is not available before indexing",
            ));
        };

        let chain = ctx.layouts.resolve_chain(&config.layout)?;
        let posts = collections.posts();
        let pages = paginate(posts.len(), config.per_page);
        let url_of = |index: usize| paginate_url(&config.first_page, &config.path, index);

        let write_home = config.home
            && url_of(0) != "/"
            && !docs.iter().any(|doc| doc.url_path() == "/");

        for index_page in &pages {
            let url = url_of(index_page.index);
            let paginator = PaginatorContext {
                page: index_page.index + 1,
                per_page: config.per_page,
                total_posts: posts.len(),
                total_pages: pages.len(),
                posts: posts[index_page.range.clone()].to_vec(),
                previous_page: index_page.previous.map(|i| i + 1),
                previous_page_path: index_page.previous.map(url_of),
                next_page: index_page.next.map(|i| i + 1),
                next_page_path: index_page.next.map(url_of),
            };

            let title = if index_page.index == 0 {
                site.title.clone()
            } else {
                format!("{} - Page {}", site.title, index_page.index + 1)
            };
            let page = PageInfo {
                title,
                url: url.clone(),
                collection: "pages".to_string(),
                ..Default::default()
            };

            let context = PageContext {
                site,
                page: &page,
                toc: &[],
                paginator: Some(&paginator),
                quill: &ctx.quill,
            }
            .to_tera()?;

            let html = ctx.layouts.compose(&chain, String::new(), &context)?;
            debug!("writing index page {} at {}", paginator.page, url);
            write_page(&url, &html, ctx.output_dir)?;

            if index_page.index == 0 && write_home {
                write_page("/", &html, ctx.output_dir)?;
            }
        }

        Ok(())
    }
}
