//! Rewrite command: localize images for a single document.

use anyhow::Result;
use mdimg_core::config::MdimgConfig;
use mdimg_core::fetch::CurlFetcher;
use mdimg_core::rewriter::Rewriter;
use std::io::{self, Write};
use std::path::Path;

use super::{cache_for, parent_dir};

pub fn run_rewrite(cfg: &MdimgConfig, path: &Path, cache_dir: Option<&str>) -> Result<()> {
    let cache = cache_for(cfg, parent_dir(path), cache_dir);
    let fetcher = CurlFetcher::new(cfg.fetch_config());
    let rewriter = Rewriter::new(&cache, &fetcher, &cfg.notice_hosts);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = rewriter.rewrite_document(path, &mut out)?;
    if outcome.updated() {
        writeln!(out, "updated {}", path.display())?;
    }
    Ok(())
}
