//! Fetching referenced images into the cache.
//!
//! Absolute URLs go through a blocking libcurl GET; anything else is a path
//! relative to the document and is copied from disk. Both write to a `.part`
//! file first and rename into place, so an interrupted fetch never leaves a
//! file the cache would later mistake for a complete image.

mod error;
mod http;
mod local;

pub use error::FetchError;
pub use http::download_to_file;
pub use local::copy_to_file;

use crate::config::FetchConfig;
use crate::url_model::is_absolute_url;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fetch-by-target operation used by the rewriter.
pub trait Fetcher {
    /// Stores the resource named by `target` at `dest` and returns the number of bytes written.
    /// Relative targets resolve against `base_dir` (the document's directory).
    fn fetch(&self, target: &str, base_dir: &Path, dest: &Path) -> Result<u64>;
}

/// Default fetcher: curl for URLs, filesystem copy for paths.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    config: FetchConfig,
}

impl CurlFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, target: &str, base_dir: &Path, dest: &Path) -> Result<u64> {
        let target = target.trim();
        if is_absolute_url(target) {
            download_to_file(target, dest, &self.config)
                .with_context(|| format!("failed to fetch {}", target))
        } else {
            copy_to_file(&base_dir.join(strip_query(target)), dest)
                .with_context(|| format!("failed to copy {}", target))
        }
    }
}

/// Path for the in-progress file: appends `.part` to the final path (e.g. `a.png` → `a.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

fn strip_query(target: &str) -> &str {
    target.split(['?', '#']).next().unwrap_or(target)
}
