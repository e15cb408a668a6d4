//! Local image cache: one flat directory keyed by filename.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Flat directory of downloaded images plus the prefix documents use to link into it.
///
/// `root` is where files live on disk; `link_base` is what gets written into a
/// document in place of the original target (`<link_base>/<name>`). For the
/// usual layout both are the same relative name, e.g. `images`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCache {
    root: PathBuf,
    link_base: String,
}

impl ImageCache {
    pub fn new(root: impl Into<PathBuf>, link_base: impl Into<String>) -> Self {
        let link_base: String = link_base.into();
        Self {
            root: root.into(),
            link_base: link_base.trim_end_matches(['/', '\\']).to_string(),
        }
    }

    /// Cache named `cache_dir` inside `dir`, linked from documents in `dir` as `cache_dir/<name>`.
    pub fn in_dir(dir: &Path, cache_dir: &str) -> Self {
        Self::new(dir.join(cache_dir), cache_dir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn link_base(&self) -> &str {
        &self.link_base
    }

    /// On-disk location for a cached file.
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Link text written into documents for a cached file.
    pub fn link_for(&self, name: &str) -> String {
        if self.link_base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.link_base, name)
        }
    }

    /// True if something named `name` already exists in the cache.
    pub fn contains(&self, name: &str) -> bool {
        self.local_path(name).exists()
    }

    /// Creates the cache directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create cache dir: {}", self.root.display()))
    }
}
