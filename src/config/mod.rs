//! Configuration loading and types for quill.
//!
//! This module handles all aspects of configuration:
//! - Type definitions for config structures (`types`)
//! - Loading and validating configs from files (`load`)

mod load;
mod types;

pub use load::site_root_from_config;
pub use types::{
    Config, ContentConfig, DevConfig, MarkdownConfig, PaginateConfig, SiteConfig, WatchConfig,
};

/// The default config file name, looked up relative to the working directory.
pub const CONFIG_FILE: &str = "quill.yaml";

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to get current working directory: {0}")]
    CwdFailure(std::io::Error),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),
}

/// Format a deserialization error with helpful context
fn format_parse_error(e: serde_yaml::Error) -> String {
    let msg = e.to_string();

    if msg.contains("missing field `site`") {
        return "invalid config: 'site' section is required\n\nExample:\n  site:\n    title: My Blog".to_string();
    }
    if msg.contains("missing field `title`") {
        return "invalid config: 'site.title' is required".to_string();
    }

    format!("invalid config: {msg}")
}

impl Config {
    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.permalink.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'content.permalink' must not be empty".to_string(),
            ));
        }
        if self.content.default_layout.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'content.default_layout' must not be empty".to_string(),
            ));
        }
        if let Some(paginate) = &self.paginate {
            if paginate.per_page == 0 {
                return Err(ConfigError::Validation(
                    "invalid config: 'paginate.per_page' must be at least 1".to_string(),
                ));
            }
            if !paginate.path.contains(":num") {
                return Err(ConfigError::Validation(format!(
                    "invalid config: 'paginate.path' must contain ':num' (got '{}')",
                    paginate.path
                )));
            }
        }
        for name in &self.content.collections {
            if matches!(name.as_str(), "posts" | "drafts" | "pages" | "layouts" | "includes") {
                return Err(ConfigError::Validation(format!(
                    "invalid config: '{}' is reserved and cannot be used as a collection name",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Config, ConfigError> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(format_parse_error(e)))?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse("site:\n  title: My Blog\n").unwrap();
        assert_eq!(config.site.title, "My Blog");
        assert_eq!(config.site.output, std::path::PathBuf::from("_site"));
        assert_eq!(config.site.baseurl, "");
        assert_eq!(config.content.permalink, "pretty");
        assert_eq!(config.content.default_layout, "default");
        assert_eq!(config.content.excerpt_separator, "\n\n");
        assert!(config.paginate.is_none());
        assert!(config.dev.live_reload);
    }

    #[test]
    fn test_paginate_section_defaults() {
        let config = parse("site:\n  title: My Blog\npaginate: {}\n").unwrap();
        let paginate = config.paginate.unwrap();
        assert_eq!(paginate.per_page, 10);
        assert_eq!(paginate.layout, "index");
        assert_eq!(paginate.first_page, "/blog/");
        assert!(paginate.home);
    }

    #[test]
    fn test_extra_site_keys_are_kept() {
        let config = parse("site:\n  title: My Blog\n  twitter: someone\n").unwrap();
        assert_eq!(
            config.site.extra.get("twitter").and_then(|v| v.as_str()),
            Some("someone")
        );
    }

    #[test]
    fn test_missing_site_is_explained() {
        let err = parse("content: {}\n").unwrap_err();
        assert!(err.to_string().contains("'site' section is required"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let err = parse("site:\n  title: t\npaginate:\n  per_page: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_paginate_path_needs_placeholder() {
        let err = parse("site:\n  title: t\npaginate:\n  path: /blog/older/\n").unwrap_err();
        assert!(err.to_string().contains(":num"));
    }

    #[test]
    fn test_reserved_collection_name() {
        let err = parse("site:\n  title: t\ncontent:\n  collections: [posts]\n").unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
