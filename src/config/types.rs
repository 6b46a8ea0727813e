//! Configuration type definitions.
//!
//! This module contains all the data structures used in `quill.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// The full site configuration, loaded once at the start of a build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub content: ContentConfig,
    /// Paginated blog index. Omit the section to skip writing index pages.
    #[serde(default)]
    pub paginate: Option<PaginateConfig>,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    /// Development-specific settings (watch mode, live reload)
    #[serde(default)]
    pub dev: DevConfig,
}

// =============================================================================
// Site configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    /// Absolute base URL, e.g. `https://example.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Path prefix the site is served under, e.g. `/blog`
    #[serde(default)]
    pub baseurl: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Any other keys, available in templates as `site.*`
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

// =============================================================================
// Content configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Permalink style (`date`, `pretty`, `none`) or a custom pattern
    #[serde(default = "default_permalink")]
    pub permalink: String,
    /// Layout used when a document does not name one
    #[serde(default = "default_layout")]
    pub default_layout: String,
    /// Layout used for posts that do not name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_layout: Option<String>,
    /// Marker separating a post's excerpt from the rest of its body
    #[serde(default = "default_excerpt_separator")]
    pub excerpt_separator: String,
    /// Render posts in `_drafts/`
    #[serde(default)]
    pub drafts: bool,
    /// Extra collections, each read from `_<name>/`
    #[serde(default)]
    pub collections: Vec<String>,
    /// Paths (relative to the site root) that are never read
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
}

fn default_permalink() -> String {
    "pretty".to_string()
}

fn default_layout() -> String {
    "default".to_string()
}

fn default_excerpt_separator() -> String {
    "\n\n".to_string()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            permalink: default_permalink(),
            default_layout: default_layout(),
            post_layout: None,
            excerpt_separator: default_excerpt_separator(),
            drafts: false,
            collections: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

// =============================================================================
// Pagination configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginateConfig {
    /// Posts per index page
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Layout the index pages are rendered with
    #[serde(default = "default_index_layout")]
    pub layout: String,
    /// URL pattern for pages after the first; `:num` is the 1-based page number
    #[serde(default = "default_paginate_path")]
    pub path: String,
    /// URL of the first index page
    #[serde(default = "default_first_page")]
    pub first_page: String,
    /// Also write the first index page as the home page when no document claims `/`
    #[serde(default = "default_home")]
    pub home: bool,
}

fn default_per_page() -> usize {
    10
}

fn default_index_layout() -> String {
    "index".to_string()
}

fn default_paginate_path() -> String {
    "/blog/page/:num/".to_string()
}

fn default_first_page() -> String {
    "/blog/".to_string()
}

fn default_home() -> bool {
    true
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            layout: default_index_layout(),
            path: default_paginate_path(),
            first_page: default_first_page(),
            home: default_home(),
        }
    }
}

// =============================================================================
// Markdown configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Extensions to enable for markdown processing
    #[serde(default = "default_markdown_extensions")]
    pub extensions: Vec<String>,
}

fn default_markdown_extensions() -> Vec<String> {
    vec![
        "definition_lists".to_string(),
        "footnotes".to_string(),
        "gfm".to_string(),
        "heading_attributes".to_string(),
        "strikethrough".to_string(),
        "tables".to_string(),
        "tasklists".to_string(),
    ]
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            extensions: default_markdown_extensions(),
        }
    }
}

// =============================================================================
// Development configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    /// File watching configuration
    #[serde(default)]
    pub watch: WatchConfig,
    /// Enable live reload in the browser when files change (default: true)
    #[serde(default = "default_live_reload")]
    pub live_reload: bool,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            watch: WatchConfig::default(),
            live_reload: true,
        }
    }
}

fn default_live_reload() -> bool {
    true
}

/// Configuration for file watching during development.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Use polling-based watcher instead of native file system events.
    /// Useful for network filesystems, Docker volumes, or other situations
    /// where native events are unreliable.
    #[serde(default)]
    pub poll: bool,
    /// Poll interval in milliseconds (only used if poll=true).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Debounce timeout in milliseconds.
    /// Changes within this window are batched together.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll: false,
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}
