use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{CONFIG_FILE, ContentConfig};

use super::document::{ContentItem, Document, DocumentKind, StaticFile};
use super::format::FormatRegistry;
use super::front_matter::has_front_matter;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("site root does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read directory entry in {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

// =============================================================================
// Site source
// =============================================================================

/// The site directory, as seen by content discovery.
pub struct SiteSource<'a> {
    /// Directory holding `quill.yaml`
    root: &'a Path,
    /// Output directory, never read even when it lives below `root`
    output_dir: &'a Path,
    content: &'a ContentConfig,
    /// Whether `_drafts/` is read
    drafts: bool,
    formats: &'a FormatRegistry,
}

/// Where a directory sits in the site layout.
#[derive(Clone)]
enum Area {
    /// Ordinary directory: documents are pages, everything else is static
    Site,
    /// A collection directory: only documents are read
    Collection(DocumentKind),
}

impl<'a> SiteSource<'a> {
    pub fn new(
        root: &'a Path,
        output_dir: &'a Path,
        content: &'a ContentConfig,
        drafts: bool,
        formats: &'a FormatRegistry,
    ) -> Self {
        Self {
            root,
            output_dir,
            content,
            drafts,
            formats,
        }
    }

    /// Discover all content under the site root.
    ///
    /// Walks the directory tree and returns all documents and static files
    /// found, ordered by source path.
    pub fn discover_content(&self) -> Result<Vec<ContentItem>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::PathNotFound(self.root.to_path_buf()));
        }

        let mut items = Vec::new();
        self.walk_directory(self.root, Path::new(""), &Area::Site, &mut items)?;
        items.sort_by(|a, b| a.source_path().cmp(b.source_path()));
        Ok(items)
    }

    /// Recursively walk a directory and collect content items.
    fn walk_directory(
        &self,
        dir: &Path,
        relative_path: &Path,
        area: &Area,
        items: &mut Vec<ContentItem>,
    ) -> Result<(), SourceError> {
        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| SourceError::ReadEntry {
                path: dir.to_path_buf(),
                source: e,
            })?;

            let path = entry.path();
            let file_name = entry.file_name();
            let file_name_str = file_name.to_string_lossy();
            let item_relative_path = relative_path.join(&file_name);

            // Skip hidden files and directories
            if file_name_str.starts_with('.') {
                continue;
            }
            if self.is_excluded(&path, &item_relative_path) {
                debug!("skipping excluded {}", item_relative_path.display());
                continue;
            }

            if path.is_dir() {
                if matches!(file_name_str.as_ref(), "node_modules" | "__pycache__" | "target") {
                    continue;
                }
                let child_area = match area {
                    Area::Site if file_name_str.starts_with('_') => {
                        // Only top-level underscore directories can be collections
                        if !relative_path.as_os_str().is_empty() {
                            continue;
                        }
                        match self.collection_kind(&file_name_str) {
                            Some(kind) => Area::Collection(kind),
                            None => continue,
                        }
                    }
                    other => other.clone(),
                };
                self.walk_directory(&path, &item_relative_path, &child_area, items)?;
            } else if path.is_file() {
                if matches!(area, Area::Site) && file_name_str.starts_with('_') {
                    continue;
                }
                if let Some(item) = self.classify_file(&path, &item_relative_path, area)? {
                    items.push(item);
                }
            }
        }

        Ok(())
    }

    /// Paths that are never read: the output directory, the config file and
    /// configured exclusions.
    fn is_excluded(&self, full_path: &Path, relative_path: &Path) -> bool {
        full_path == self.output_dir
            || relative_path == Path::new(CONFIG_FILE)
            || self
                .content
                .exclude
                .iter()
                .any(|excluded| relative_path.starts_with(excluded))
    }

    /// The kind of documents a top-level `_name` directory holds, if it is read.
    fn collection_kind(&self, dir_name: &str) -> Option<DocumentKind> {
        match dir_name {
            "_posts" => Some(DocumentKind::Post),
            "_drafts" if self.drafts => Some(DocumentKind::Draft),
            _ => {
                let name = dir_name.strip_prefix('_')?;
                self.content
                    .collections
                    .iter()
                    .any(|c| c == name)
                    .then(|| DocumentKind::Collection(name.to_string()))
            }
        }
    }

    /// Classify a file as either a Document or StaticFile.
    ///
    /// Files inside collection directories that are not documents are skipped.
    fn classify_file(
        &self,
        full_path: &Path,
        relative_path: &Path,
        area: &Area,
    ) -> Result<Option<ContentItem>, SourceError> {
        let is_document = match self.formats.for_path(relative_path) {
            Some(format) if format.requires_front_matter() => {
                let text = std::fs::read_to_string(full_path).map_err(|e| SourceError::ReadFile {
                    path: full_path.to_path_buf(),
                    source: e,
                })?;
                has_front_matter(&text)
            }
            Some(_) => true,
            None => false,
        };

        let item = match (area, is_document) {
            (Area::Site, true) => Some(ContentItem::Document(Document::discovered(
                relative_path.to_path_buf(),
                DocumentKind::Page,
            ))),
            (Area::Site, false) => Some(ContentItem::Static(StaticFile::new(
                relative_path.to_path_buf(),
            ))),
            (Area::Collection(kind), true) => Some(ContentItem::Document(Document::discovered(
                relative_path.to_path_buf(),
                kind.clone(),
            ))),
            (Area::Collection(_), false) => {
                debug!("skipping non-document {}", relative_path.display());
                None
            }
        };
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, path: &str, content: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "quill.yaml", "site:\n  title: t\n");
        write(root, "index.md", "---\ntitle: Home\n---\n");
        write(root, "about.md", "About");
        write(root, "404.html", "---\nlayout: default\n---\nNot found");
        write(root, "plain.html", "<p>static</p>");
        write(root, "assets/css/style.css", "body {}");
        write(root, "_posts/2026-02-22-mcp.md", "---\n---\nPost");
        write(root, "_posts/diagram.png", "png");
        write(root, "_drafts/idea.md", "Draft");
        write(root, "_layouts/default.html", "{{ content }}");
        write(root, "_includes/head.html", "<head>");
        write(root, "_recipes/soup.md", "Soup");
        write(root, "_unknown/thing.md", "Ignored");
        write(root, "_config.yml", "ignored");
        write(root, ".hidden/secret.md", "Hidden");
        write(root, "_site/old.html", "stale");
        write(root, "notes/private/todo.md", "Excluded");
        write(root, "docs/_partial/x.md", "Nested underscore");
        dir
    }

    fn discover(root: &Path, content: &ContentConfig, drafts: bool) -> Vec<ContentItem> {
        let formats = FormatRegistry::with_defaults();
        let output = root.join("_site");
        SiteSource::new(root, &output, content, drafts, &formats)
            .discover_content()
            .unwrap()
    }

    fn summary(items: &[ContentItem]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|item| {
                let kind = match item {
                    ContentItem::Document(doc) => format!("{:?}", doc.kind),
                    ContentItem::Static(_) => "Static".to_string(),
                };
                (item.source_path().to_string_lossy().replace('\\', "/"), kind)
            })
            .collect()
    }

    #[test]
    fn test_discover_classifies_content() {
        let dir = site();
        let content = ContentConfig {
            collections: vec!["recipes".to_string()],
            exclude: vec![PathBuf::from("notes/private")],
            ..Default::default()
        };

        let items = discover(dir.path(), &content, false);
        let found = summary(&items);
        let found: Vec<(&str, &str)> = found.iter().map(|(p, k)| (p.as_str(), k.as_str())).collect();

        assert_eq!(
            found,
            vec![
                ("404.html", "Page"),
                ("_posts/2026-02-22-mcp.md", "Post"),
                ("_recipes/soup.md", "Collection(\"recipes\")"),
                ("about.md", "Page"),
                ("assets/css/style.css", "Static"),
                ("index.md", "Page"),
                ("plain.html", "Static"),
            ]
        );
    }

    #[test]
    fn test_drafts_only_when_enabled() {
        let dir = site();
        let content = ContentConfig::default();

        let without = summary(&discover(dir.path(), &content, false));
        assert!(!without.iter().any(|(p, _)| p.starts_with("_drafts")));

        let with = summary(&discover(dir.path(), &content, true));
        assert!(with.contains(&("_drafts/idea.md".to_string(), "Draft".to_string())));
    }

    #[test]
    fn test_static_file_path() {
        let dir = site();
        let items = discover(dir.path(), &ContentConfig::default(), false);
        let css = items
            .iter()
            .find_map(|item| match item {
                ContentItem::Static(file) if file.source_path.ends_with("style.css") => Some(file),
                _ => None,
            })
            .unwrap();
        assert_eq!(css.source_path, PathBuf::from("assets/css/style.css"));
    }

    #[test]
    fn test_missing_root() {
        let formats = FormatRegistry::with_defaults();
        let content = ContentConfig::default();
        let missing = Path::new("/definitely/not/here");
        let result =
            SiteSource::new(missing, &missing.join("_site"), &content, false, &formats).discover_content();
        assert!(matches!(result, Err(SourceError::PathNotFound(_))));
    }
}
