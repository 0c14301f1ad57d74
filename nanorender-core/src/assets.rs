/// Locating bundled model files from wherever the binary is started
use std::path::{Path, PathBuf};

use thiserror::Error;

/// How many parent directories are searched by default
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Directory name the search looks for in each ancestor
pub const ASSET_DIR: &str = "assets";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("{relative} not found under an `assets` dir within {max_depth} levels of {start}")]
    NotFound {
        relative: PathBuf,
        start: PathBuf,
        max_depth: usize,
    },
}

/// Find `assets/<relative>` in `start` or one of its first `max_depth`
/// ancestors, nearest first.
pub fn resolve(
    start: impl AsRef<Path>,
    relative: impl AsRef<Path>,
    max_depth: usize,
) -> Result<PathBuf, AssetError> {
    let (start, relative) = (start.as_ref(), relative.as_ref());
    start
        .ancestors()
        .take(max_depth + 1)
        .map(|dir| dir.join(ASSET_DIR).join(relative))
        .find(|candidate| candidate.exists())
        .inspect(|found| log::debug!("resolved {} to {}", relative.display(), found.display()))
        .ok_or_else(|| AssetError::NotFound {
            relative: relative.to_path_buf(),
            start: start.to_path_buf(),
            max_depth,
        })
}

/// Use `path` as given when it exists, otherwise look it up as an asset
/// relative to the current directory.
pub fn locate(path: impl AsRef<Path>, max_depth: usize) -> Result<PathBuf, AssetError> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve(cwd, path, max_depth)
}
