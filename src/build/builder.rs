use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::Config;

use super::assets::{MissingAssetError, check_assets};
use super::collection::{Collections, paginate};
use super::document::{ContentItem, StaticFile};
use super::permalink::paginate_url;
use super::format::FormatRegistry;
use super::layout::{LayoutError, LayoutRegistry};
use super::pipeline::{DocumentFailure, Pipeline, PipelineContext, PipelineError, ProcessingDocument};
use super::render::SiteContext;
use super::source::{SiteSource, SourceError};

#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("unresolvable configuration: {0}")]
    UnresolvableConfiguration(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("failed to copy {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Who ends up owning a URL that more than one output claims.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlOwner {
    Document(PathBuf),
    /// Blog index page, numbered from 1
    IndexPage(usize),
}

/// A document whose output was replaced by a later write to the same URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlConflict {
    pub url: String,
    pub overwritten: PathBuf,
    pub kept: UrlOwner,
}

#[derive(Debug)]
pub struct BuildResult {
    pub output_dir: PathBuf,
    /// Documents written
    pub documents: usize,
    pub static_files: usize,
    /// Blog index pages written
    pub index_pages: usize,
    /// Documents left out because one of their stages failed
    pub failures: Vec<DocumentFailure>,
    pub missing_assets: Vec<MissingAssetError>,
    pub url_conflicts: Vec<UrlConflict>,
}

impl BuildResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Builder {
    config: Config,
    /// Directory holding `quill.yaml`; everything is read relative to it
    site_root: PathBuf,
    /// Overrides `site.output`
    output_dir: Option<PathBuf>,
    drafts: bool,
    dev_mode: bool,
    live_reload: bool,
}

impl Builder {
    pub fn new(config: Config, site_root: PathBuf) -> Self {
        let drafts = config.content.drafts;
        let live_reload = config.dev.live_reload;
        Self {
            config,
            site_root,
            output_dir: None,
            drafts,
            dev_mode: false,
            live_reload,
        }
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Also render posts from `_drafts/`.
    pub fn with_drafts(mut self, drafts: bool) -> Self {
        self.drafts = self.drafts || drafts;
        self
    }

    /// Set dev mode (enables dev-only template features).
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// Set live reload (only effective when dev_mode is also true).
    pub fn with_live_reload(mut self, live_reload: bool) -> Self {
        self.live_reload = live_reload;
        self
    }

    pub fn build(&self) -> Result<BuildResult, BuildError> {
        // Build pipeline:
        // 1. Discover content -> ContentItem[]
        // 2. Load layouts and check the site-wide ones resolve
        // 3. Clean the output directory
        // 4. Parse front matter, drop unpublished documents, render the rest
        // 5. Index collections (barrier) and look for URL conflicts
        // 6. Copy static files
        // 7. Publish phase (per document) and blog index
        // 8. Check referenced assets

        let output_dir = self.output_dir();
        self.check_output_dir(&output_dir)?;

        // Step 1: Discover content
        let formats = FormatRegistry::with_defaults();
        let items = SiteSource::new(
            &self.site_root,
            &output_dir,
            &self.config.content,
            self.drafts,
            &formats,
        )
        .discover_content()?;

        let mut docs = Vec::new();
        let mut static_files = Vec::new();
        for item in items {
            match item {
                ContentItem::Document(doc) => docs.push(ProcessingDocument::new(doc)),
                ContentItem::Static(file) => static_files.push(file),
            }
        }
        info!(
            "Found {} document(s) and {} static file(s)",
            docs.len(),
            static_files.len()
        );

        // Step 2: Load layouts
        let layouts = LayoutRegistry::load(
            &self.site_root.join("_layouts"),
            &self.site_root.join("_includes"),
        )?;
        self.check_site_layouts(&layouts)?;

        // Step 3: Start from an empty output directory
        if output_dir.exists() {
            std::fs::remove_dir_all(&output_dir)?;
        }
        std::fs::create_dir_all(&output_dir)?;

        // Step 4: Render phase
        let ctx = PipelineContext::new(
            &self.site_root,
            &output_dir,
            &self.config,
            &formats,
            &layouts,
            self.dev_mode,
            self.live_reload,
        );
        let mut failures = Pipeline::parse_pipeline().run(&mut docs, &ctx)?;

        docs.retain(|doc| {
            let published = doc.doc.front_matter.is_published();
            if !published {
                debug!("skipping unpublished {}", doc.doc.source_path.display());
            }
            published
        });
        failures.extend(Pipeline::render_pipeline().run(&mut docs, &ctx)?);

        // Step 5: Collections
        let collections = Collections::index(&docs, &self.config.content.collections);
        let site = self.site_context(&collections);
        let index_urls = self.index_urls(collections.posts().len());
        let url_conflicts = find_url_conflicts(&docs, &index_urls);

        // Step 6: Static files
        for file in &static_files {
            self.copy_static(file, &output_dir)?;
        }

        // Step 7: Publish phase
        let ctx = ctx.with_index(&site, &collections);
        failures.extend(Pipeline::publish_pipeline().run(&mut docs, &ctx)?);
        let index_pages = index_urls.len();

        // Step 8: Assets
        let missing_assets = check_assets(&docs, &output_dir, &self.config.site.baseurl);
        for missing in &missing_assets {
            warn!("{}", missing);
        }

        info!(
            "Wrote {} document(s), {} index page(s) and {} static file(s) to {}",
            docs.len(),
            index_pages,
            static_files.len(),
            output_dir.display()
        );
        if !failures.is_empty() {
            warn!("{} document(s) failed", failures.len());
        }

        Ok(BuildResult {
            output_dir,
            documents: docs.len(),
            static_files: static_files.len(),
            index_pages,
            failures,
            missing_assets,
            url_conflicts,
        })
    }

    /// URLs of the blog index pages for `posts` posts, first page first.
    fn index_urls(&self, posts: usize) -> Vec<String> {
        let Some(config) = &self.config.paginate else {
            return Vec::new();
        };
        paginate(posts, config.per_page)
            .iter()
            .map(|page| paginate_url(&config.first_page, &config.path, page.index))
            .collect()
    }

    /// Get the output directory path, resolved against the site root.
    pub fn output_dir(&self) -> PathBuf {
        let output = self.output_dir.as_ref().unwrap_or(&self.config.site.output);
        if output.is_relative() {
            self.site_root.join(output)
        } else {
            output.clone()
        }
    }

    /// The output directory is wiped on every build, so it must not contain
    /// the site itself.
    fn check_output_dir(&self, output_dir: &Path) -> Result<(), BuildError> {
        let root = self
            .site_root
            .canonicalize()
            .map_err(|_| SourceError::PathNotFound(self.site_root.clone()))?;
        let output = output_dir
            .canonicalize()
            .unwrap_or_else(|_| output_dir.to_path_buf());

        if root.starts_with(&output) {
            return Err(BuildError::UnresolvableConfiguration(format!(
                "output directory {} contains the site root",
                output_dir.display()
            )));
        }
        Ok(())
    }

    /// The default, post and index layouts must resolve for the build to start.
    fn check_site_layouts(&self, layouts: &LayoutRegistry) -> Result<(), BuildError> {
        let content = &self.config.content;
        let mut required = vec![("default", content.default_layout.as_str())];
        if let Some(post_layout) = &content.post_layout {
            required.push(("post", post_layout));
        }
        if let Some(paginate_config) = &self.config.paginate {
            required.push(("paginate", &paginate_config.layout));
        }

        for (role, name) in required {
            layouts.resolve_chain(name).map_err(|e| {
                BuildError::UnresolvableConfiguration(format!("{} layout: {}", role, e))
            })?;
        }
        Ok(())
    }

    fn site_context(&self, collections: &Collections) -> SiteContext {
        let site = &self.config.site;
        SiteContext {
            title: site.title.clone(),
            url: site.url.clone(),
            baseurl: site.baseurl.clone(),
            description: site.description.clone(),
            author: site.author.clone(),
            time: chrono::Local::now().to_rfc3339(),
            posts: collections.posts().to_vec(),
            pages: collections.pages().to_vec(),
            collections: collections.all().clone(),
            tags: collections.tags().clone(),
            categories: collections.categories().clone(),
            extra: site.extra.clone(),
        }
    }

    fn copy_static(&self, file: &StaticFile, output_dir: &Path) -> Result<(), BuildError> {
        let input_path = self.site_root.join(&file.source_path);
        let output_path = output_dir.join(&file.source_path);

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&input_path, &output_path).map_err(|source| BuildError::Copy {
            path: file.source_path.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Find documents whose output is replaced by another write to the same URL.
///
/// Documents are written in source-path order, so the later one wins; blog
/// index pages are written after every document and win over all of them.
fn find_url_conflicts(docs: &[ProcessingDocument], index_urls: &[String]) -> Vec<UrlConflict> {
    let mut owners: HashMap<&str, &Path> = HashMap::new();
    let mut conflicts = Vec::new();

    for doc in docs {
        if let Some(previous) = owners.insert(doc.url_path(), &doc.doc.source_path) {
            conflicts.push(UrlConflict {
                url: doc.url_path().to_string(),
                overwritten: previous.to_path_buf(),
                kept: UrlOwner::Document(doc.doc.source_path.clone()),
            });
        }
    }
    for (index, url) in index_urls.iter().enumerate() {
        if let Some(previous) = owners.remove(url.as_str()) {
            conflicts.push(UrlConflict {
                url: url.clone(),
                overwritten: previous.to_path_buf(),
                kept: UrlOwner::IndexPage(index + 1),
            });
        }
    }

    for conflict in &conflicts {
        match &conflict.kept {
            UrlOwner::Document(kept) => warn!(
                "{} and {} both resolve to {}; keeping {}",
                conflict.overwritten.display(),
                kept.display(),
                conflict.url,
                kept.display()
            ),
            UrlOwner::IndexPage(page) => warn!(
                "{} resolves to {}, which is blog index page {}; keeping the index page",
                conflict.overwritten.display(),
                conflict.url,
                page
            ),
        }
    }
    conflicts
}
