//! Directory driver: run the rewriter over every document in one directory.
//!
//! No recursion and no parallelism. Documents are visited in directory-listing
//! order and the first error stops the run.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::rewriter::{display_name, Rewriter};

/// Totals for one directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub updated: usize,
    pub fetched: usize,
}

/// Regular files directly in `dir` whose name ends in `.<extension>`, compared case-insensitively.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension.trim_start_matches('.').to_lowercase());
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to list directory: {}", dir.display()))?;

    let mut docs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list directory: {}", dir.display()))?;
        let name = entry.file_name();
        if !name.to_string_lossy().to_lowercase().ends_with(&suffix) {
            continue;
        }
        let path = entry.path();
        if path.is_file() {
            docs.push(path);
        }
    }
    Ok(docs)
}

/// Rewrites every document in `dir`, writing notices and `updated <name>` lines to `out`.
pub fn run_directory(
    dir: &Path,
    extension: &str,
    rewriter: &Rewriter<'_>,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let docs = list_documents(dir, extension)?;
    tracing::info!(
        dir = %dir.display(),
        documents = docs.len(),
        cache = %rewriter.cache().root().display(),
        "processing directory"
    );

    let mut summary = RunSummary::default();
    for doc in &docs {
        let outcome = rewriter.rewrite_document(doc, out)?;
        summary.documents += 1;
        summary.fetched += outcome.rewrite.fetched;
        if outcome.updated() {
            summary.updated += 1;
            writeln!(out, "updated {}", display_name(doc))?;
        }
    }

    tracing::info!(
        documents = summary.documents,
        updated = summary.updated,
        fetched = summary.fetched,
        "directory done"
    );
    Ok(summary)
}
