pub mod build;
pub mod clean;
pub mod init;
pub mod serve;

use std::path::{Path, PathBuf};

/// Resolve a command line path against the working directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf, std::io::Error> {
    if path.is_relative() {
        Ok(std::env::current_dir()?.join(path))
    } else {
        Ok(path.to_path_buf())
    }
}
