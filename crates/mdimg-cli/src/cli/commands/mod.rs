//! CLI command handlers. Each command is in its own file.

mod rewrite;
mod run;
mod scan;

pub use rewrite::run_rewrite;
pub use run::run_directory_command;
pub use scan::run_scan;

use mdimg_core::cache::ImageCache;
use mdimg_core::config::MdimgConfig;
use std::path::Path;

/// Cache for documents living in `dir`; the CLI flag wins over config.
pub(crate) fn cache_for(cfg: &MdimgConfig, dir: &Path, cache_dir: Option<&str>) -> ImageCache {
    ImageCache::in_dir(dir, cache_dir.unwrap_or(&cfg.cache_dir))
}

/// Directory a document lives in ("." for bare file names).
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
