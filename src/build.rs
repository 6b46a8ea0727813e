mod assets;
mod builder;
mod collection;
mod document;
pub mod format;
mod front_matter;
mod layout;
mod markdown;
mod permalink;
pub mod pipeline;
mod render;
pub mod source;
mod watch;

pub use builder::{BuildResult, Builder};
pub use watch::{FileWatcher, PathClassifier, WatchEvent};
