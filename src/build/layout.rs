//! Layouts and their composition.
//!
//! A layout is a Tera template in `_layouts/` that wraps rendered content.
//! Its own front matter may name a parent layout, forming a chain:
//!
//! ```html
//! ---
//! layout: default
//! ---
//! <article>{{ content }}</article>
//! ```
//!
//! Files in `_includes/` are registered under their relative path and can be
//! pulled into any layout with `{% include "header.html" %}`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use log::debug;
use tera::Context;

use super::front_matter::{FrontMatter, FrontMatterError, parse_front_matter};
use super::render::{RenderError, Renderer};

#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("unknown layout '{name}'")]
    Unknown { name: String },

    #[error("layout cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("invalid front matter in layout {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: FrontMatterError,
    },

    #[error("layout '{name}': {source}")]
    Template { name: String, source: RenderError },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A single layout file.
#[derive(Debug, Clone)]
pub struct Layout {
    /// File stem, e.g. `post` for `_layouts/post.html`
    pub name: String,
    /// Parent layout this one is wrapped in, if any
    pub parent: Option<String>,
    /// The layout's own front matter, exposed to templates as `layout.*`
    pub front_matter: FrontMatter,
}

/// All layouts of a site, plus the renderer that holds their templates.
pub struct LayoutRegistry {
    layouts: HashMap<String, Layout>,
    renderer: Renderer,
}

/// Name a layout's template is registered under.
fn template_name(layout: &str) -> String {
    format!("_layouts/{layout}")
}

impl LayoutRegistry {
    /// Load every layout in `layouts_dir` and every include in `includes_dir`.
    ///
    /// Missing directories are treated as empty. Template syntax errors fail
    /// the whole load.
    pub fn load(layouts_dir: &Path, includes_dir: &Path) -> Result<Self, LayoutError> {
        let mut layouts = HashMap::new();
        let mut templates: Vec<(String, String)> = Vec::new();

        for path in list_files(layouts_dir)? {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let (layout, template) = parse_layout(name, &read(&path)?, &path)?;
            debug!("loaded layout '{}' (parent: {:?})", name, layout.parent);
            templates.push((template_name(name), template));
            layouts.insert(name.to_string(), layout);
        }

        for path in list_files(includes_dir)? {
            let Ok(relative) = path.strip_prefix(includes_dir) else {
                continue;
            };
            let name = relative.to_string_lossy().replace('\\', "/");
            templates.push((name, read(&path)?));
        }

        Self::from_templates(layouts, templates)
    }

    /// Build a registry from in-memory layout sources, keyed by name.
    #[cfg(test)]
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, LayoutError> {
        let mut layouts = HashMap::new();
        let mut templates = Vec::new();
        for (name, text) in sources {
            let (layout, template) = parse_layout(name, text, Path::new(&template_name(name)))?;
            templates.push((template_name(name), template));
            layouts.insert(name.to_string(), layout);
        }
        Self::from_templates(layouts, templates)
    }

    fn from_templates(
        layouts: HashMap<String, Layout>,
        templates: Vec<(String, String)>,
    ) -> Result<Self, LayoutError> {
        let mut renderer = Renderer::new();
        renderer
            .add_templates(templates)
            .map_err(|source| LayoutError::Template {
                name: "(templates)".to_string(),
                source,
            })?;
        Ok(Self { layouts, renderer })
    }

    /// Resolve the chain of layouts starting at `name`, innermost first.
    ///
    /// Walks parents iteratively, failing on an unknown name or a name that
    /// was already visited.
    pub fn resolve_chain(&self, name: &str) -> Result<Vec<String>, LayoutError> {
        let mut chain: Vec<String> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut current = Some(name);

        while let Some(name) = current {
            if !visited.insert(name) {
                chain.push(name.to_string());
                return Err(LayoutError::Cycle { chain });
            }
            let layout = self.layouts.get(name).ok_or_else(|| LayoutError::Unknown {
                name: name.to_string(),
            })?;
            chain.push(layout.name.clone());
            current = layout.parent.as_deref();
        }

        Ok(chain)
    }

    /// Wrap `body` in each layout of `chain`, innermost first.
    ///
    /// Each layout sees the previous result as `content` and its own front
    /// matter as `layout`, on top of `context`.
    pub fn compose(
        &self,
        chain: &[String],
        body: String,
        context: &Context,
    ) -> Result<String, LayoutError> {
        let mut context = context.clone();
        let mut content = body;

        for name in chain {
            let layout = self.layouts.get(name).ok_or_else(|| LayoutError::Unknown {
                name: name.clone(),
            })?;
            context.insert("content", &content);
            context.insert("layout", &layout.front_matter);
            content = self
                .renderer
                .render(&template_name(name), &context)
                .map_err(|source| LayoutError::Template {
                    name: name.clone(),
                    source,
                })?;
        }

        Ok(content)
    }
}

/// Split a layout file into its metadata and template text.
fn parse_layout(name: &str, text: &str, path: &Path) -> Result<(Layout, String), LayoutError> {
    let parsed = parse_front_matter(text).map_err(|source| LayoutError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;
    let parent = parsed
        .front_matter
        .layout()
        .flatten()
        .map(str::to_string);

    let layout = Layout {
        name: name.to_string(),
        parent,
        front_matter: parsed.front_matter,
    };
    Ok((layout, parsed.content))
}

/// Every file below `dir`, sorted, skipping hidden entries.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, LayoutError> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = std::fs::read_dir(&current).map_err(|source| LayoutError::Io {
            path: current.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| LayoutError::Io {
                path: current.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn read(path: &Path) -> Result<String, LayoutError> {
    std::fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })
}
