//! Copying a document-relative image into the cache.

use super::temp_path;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Copies `src` to `dest` via `dest.part`. Returns the number of bytes copied.
pub fn copy_to_file(src: &Path, dest: &Path) -> Result<u64> {
    let part = temp_path(dest);
    let copied = fs::copy(src, &part)
        .with_context(|| format!("failed to copy {} to {}", src.display(), part.display()));
    let n = match copied {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&part);
            return Err(e);
        }
    };
    fs::rename(&part, dest).with_context(|| {
        format!("failed to rename {} to {}", part.display(), dest.display())
    })?;
    tracing::debug!(src = %src.display(), bytes = n, dest = %dest.display(), "copied");
    Ok(n)
}
