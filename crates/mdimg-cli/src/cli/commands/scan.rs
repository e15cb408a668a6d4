//! Scan command: list image references and their cache status.

use anyhow::Result;
use mdimg_core::config::MdimgConfig;
use mdimg_core::rewriter::{scan_document, ScanEntry};
use std::path::Path;

use super::{cache_for, parent_dir};

pub fn run_scan(cfg: &MdimgConfig, path: &Path, cache_dir: Option<&str>) -> Result<()> {
    let cache = cache_for(cfg, parent_dir(path), cache_dir);
    let entries = scan_document(path, &cache)?;

    if entries.is_empty() {
        println!("no image references in {}", path.display());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry, cache.link_base()));
    }
    Ok(())
}

fn format_entry(entry: &ScanEntry, link_base: &str) -> String {
    let status = match (&entry.cache_name, entry.cached) {
        (None, _) => "skip".to_string(),
        (Some(_), true) => "cached".to_string(),
        (Some(name), false) => format!("fetch -> {}/{}", link_base, name),
    };
    format!("{:<8} {}", status, entry.reference.target)
}
