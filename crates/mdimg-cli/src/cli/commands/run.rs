//! Run command: localize images for every document in a directory.

use anyhow::Result;
use mdimg_core::config::MdimgConfig;
use mdimg_core::driver;
use mdimg_core::fetch::CurlFetcher;
use mdimg_core::rewriter::Rewriter;
use std::io;
use std::path::Path;

use super::cache_for;

pub fn run_directory_command(cfg: &MdimgConfig, dir: &Path, cache_dir: Option<&str>) -> Result<()> {
    let cache = cache_for(cfg, dir, cache_dir);
    let fetcher = CurlFetcher::new(cfg.fetch_config());
    let rewriter = Rewriter::new(&cache, &fetcher, &cfg.notice_hosts);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = driver::run_directory(dir, &cfg.extension, &rewriter, &mut out)?;
    tracing::debug!(?summary, "run finished");
    Ok(())
}
