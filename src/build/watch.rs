//! File watching for automatic rebuilds.
//!
//! Uses `notify-debouncer-full` to watch the site directory, which holds
//! content, layouts, includes and the config file.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Config as NotifyConfig, EventKind, PollWatcher, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{
    DebounceEventResult, Debouncer, RecommendedCache, new_debouncer, new_debouncer_opt,
};

use crate::config::WatchConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
}

// =============================================================================
// Watch events
// =============================================================================

/// What kind of file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// `quill.yaml` changed; it is reloaded before rebuilding.
    Config,
    /// A layout or include changed.
    Layout { path: PathBuf },
    /// A file a content format can render.
    Document { path: PathBuf, deleted: bool },
    /// Anything else below the site root.
    StaticFile { path: PathBuf, deleted: bool },
}

impl ChangeKind {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ChangeKind::Config => None,
            ChangeKind::Layout { path }
            | ChangeKind::Document { path, .. }
            | ChangeKind::StaticFile { path, .. } => Some(path),
        }
    }
}

/// Events sent from the file watcher.
#[derive(Debug)]
pub enum WatchEvent {
    /// Files changed, rebuild needed.
    FilesChanged(Vec<ChangeKind>),
    /// Watcher error occurred.
    Error(String),
}

// =============================================================================
// Path classification
// =============================================================================

/// Classifies file paths into change types.
#[derive(Clone)]
pub struct PathClassifier {
    site_root: PathBuf,
    /// Writes here come from the build itself
    output_dir: PathBuf,
    config_path: PathBuf,
}

impl PathClassifier {
    /// Create a new path classifier. Paths should be canonical, matching
    /// what the OS reports in events.
    pub fn new(site_root: PathBuf, output_dir: PathBuf, config_path: PathBuf) -> Self {
        Self {
            site_root,
            output_dir,
            config_path,
        }
    }

    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Classify a changed path into a ChangeKind.
    pub fn classify(&self, path: &Path, deleted: bool) -> Option<ChangeKind> {
        if path == self.config_path {
            return Some(ChangeKind::Config);
        }
        if path.starts_with(&self.output_dir) {
            return None;
        }
        let relative = path.strip_prefix(&self.site_root).ok()?;

        // Skip hidden files and directories
        if relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }

        if relative.starts_with("_layouts") || relative.starts_with("_includes") {
            return Some(ChangeKind::Layout {
                path: relative.to_path_buf(),
            });
        }

        let ext = relative.extension().and_then(|e| e.to_str());
        match ext {
            Some("md" | "markdown" | "html" | "htm") => Some(ChangeKind::Document {
                path: relative.to_path_buf(),
                deleted,
            }),
            _ => Some(ChangeKind::StaticFile {
                path: relative.to_path_buf(),
                deleted,
            }),
        }
    }
}

// =============================================================================
// File watcher
// =============================================================================

/// A file watcher that can use either native or polling backend.
pub enum FileWatcher {
    /// Native file system watcher (recommended for local development).
    Native {
        _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
    /// Polling-based watcher (for network filesystems, Docker, etc.).
    Polling {
        _debouncer: Debouncer<PollWatcher, RecommendedCache>,
        rx: Receiver<WatchEvent>,
    },
}

impl FileWatcher {
    /// Watch the classifier's site root.
    pub fn new(config: &WatchConfig, classifier: PathClassifier) -> Result<Self, WatchError> {
        let debounce_timeout = Duration::from_millis(config.debounce_ms);
        let site_root = classifier.site_root().to_path_buf();

        let (tx, rx) = mpsc::channel();

        let callback = move |result: DebounceEventResult| match result {
            Ok(events) => {
                let mut changes: Vec<ChangeKind> = events
                    .iter()
                    .filter(|event| is_relevant_event(&event.kind))
                    .filter_map(|event| {
                        let deleted = matches!(event.kind, EventKind::Remove(_));
                        event
                            .paths
                            .first()
                            .and_then(|p| classifier.classify(p, deleted))
                    })
                    .collect();
                changes.dedup();

                if !changes.is_empty() {
                    let _ = tx.send(WatchEvent::FilesChanged(changes));
                }
            }
            Err(errors) => {
                for e in errors {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            }
        };

        if config.poll {
            let poll_interval = Duration::from_millis(config.poll_interval_ms);
            let notify_config = NotifyConfig::default().with_poll_interval(poll_interval);

            let mut debouncer = new_debouncer_opt::<_, PollWatcher, RecommendedCache>(
                debounce_timeout,
                None,
                callback,
                RecommendedCache::default(),
                notify_config,
            )?;
            debouncer.watch(&site_root, RecursiveMode::Recursive)?;

            Ok(FileWatcher::Polling {
                _debouncer: debouncer,
                rx,
            })
        } else {
            let mut debouncer = new_debouncer(debounce_timeout, None, callback)?;
            debouncer.watch(&site_root, RecursiveMode::Recursive)?;

            Ok(FileWatcher::Native {
                _debouncer: debouncer,
                rx,
            })
        }
    }

    /// Receive the next watch event (blocking).
    pub fn recv(&self) -> Option<WatchEvent> {
        match self {
            FileWatcher::Native { rx, .. } => rx.recv().ok(),
            FileWatcher::Polling { rx, .. } => rx.recv().ok(),
        }
    }
}

/// Check if an event kind is relevant for rebuilds.
fn is_relevant_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PathClassifier {
        PathClassifier::new(
            PathBuf::from("/site"),
            PathBuf::from("/site/_site"),
            PathBuf::from("/site/quill.yaml"),
        )
    }

    #[test]
    fn test_classify_site_paths() {
        let c = classifier();

        assert_eq!(
            c.classify(Path::new("/site/quill.yaml"), false),
            Some(ChangeKind::Config)
        );
        assert_eq!(
            c.classify(Path::new("/site/_layouts/post.html"), false),
            Some(ChangeKind::Layout {
                path: PathBuf::from("_layouts/post.html")
            })
        );
        assert_eq!(
            c.classify(Path::new("/site/_includes/nav.html"), true),
            Some(ChangeKind::Layout {
                path: PathBuf::from("_includes/nav.html")
            })
        );
        assert_eq!(
            c.classify(Path::new("/site/_posts/2026-02-22-mcp.md"), true),
            Some(ChangeKind::Document {
                path: PathBuf::from("_posts/2026-02-22-mcp.md"),
                deleted: true
            })
        );
        assert_eq!(
            c.classify(Path::new("/site/assets/site.css"), false),
            Some(ChangeKind::StaticFile {
                path: PathBuf::from("assets/site.css"),
                deleted: false
            })
        );
    }

    #[test]
    fn test_ignored_paths() {
        let c = classifier();

        assert_eq!(c.classify(Path::new("/site/_site/index.html"), false), None);
        assert_eq!(c.classify(Path::new("/site/.git/HEAD"), false), None);
        assert_eq!(c.classify(Path::new("/site/_posts/.a.md.swp"), false), None);
        assert_eq!(c.classify(Path::new("/elsewhere/a.md"), false), None);
    }

    #[test]
    fn test_hidden_site_root_is_fine() {
        let c = PathClassifier::new(
            PathBuf::from("/home/me/.sites/blog"),
            PathBuf::from("/home/me/.sites/blog/_site"),
            PathBuf::from("/home/me/.sites/blog/quill.yaml"),
        );
        assert!(matches!(
            c.classify(Path::new("/home/me/.sites/blog/about.md"), false),
            Some(ChangeKind::Document { .. })
        ));
    }
}
