//! Document rewriter: localize every image reference in one document.
//!
//! References are handled strictly left to right. For each one the cache
//! filename is derived from the target, the image is fetched unless the cache
//! already has it, and only the captured target is replaced by the cache link.
//! Scanning resumes right after the replaced span.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cache::ImageCache;
use crate::fetch::Fetcher;
use crate::reference::{self, ImageRef};
use crate::url_model::cache_filename;

/// Result of rewriting a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Text with every cacheable reference pointing into the cache.
    pub text: String,
    /// Number of references encountered.
    pub references: usize,
    /// Number of references whose image was freshly fetched.
    pub fetched: usize,
}

impl Rewrite {
    /// True iff at least one image was freshly fetched.
    pub fn updated(&self) -> bool {
        self.fetched > 0
    }
}

/// Result of rewriting a document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub path: PathBuf,
    pub rewrite: Rewrite,
    /// Whether the document was written back.
    pub written: bool,
}

impl RewriteOutcome {
    pub fn updated(&self) -> bool {
        self.rewrite.updated()
    }
}

/// One reference as seen by `scan_document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub reference: ImageRef,
    /// Cache filename, or `None` when the target has no usable basename.
    pub cache_name: Option<String>,
    pub cached: bool,
}

/// Rewrites `text`, fetching uncached images through `fetcher`.
///
/// Relative targets resolve against `base_dir`. A reference whose target has
/// no usable basename is left as written.
pub fn rewrite_text(
    text: &str,
    base_dir: &Path,
    cache: &ImageCache,
    fetcher: &dyn Fetcher,
) -> Result<Rewrite> {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    let mut references = 0;
    let mut fetched = 0;

    while let Some(r) = reference::find_from(text, pos) {
        references += 1;
        out.push_str(&text[pos..r.span.start]);

        match cache_filename(&r.target) {
            Some(name) => {
                if cache.contains(&name) {
                    tracing::debug!(target_ref = %r.target, name = %name, "already cached");
                } else {
                    cache.ensure_dir()?;
                    let local = cache.local_path(&name);
                    let bytes = fetcher.fetch(&r.target, base_dir, &local)?;
                    tracing::info!(target_ref = %r.target, bytes, dest = %local.display(), "fetched image");
                    fetched += 1;
                }
                out.push_str(&cache.link_for(&name));
            }
            None => {
                tracing::warn!(target_ref = %r.target, "no usable filename; leaving reference as is");
                out.push_str(&r.target);
            }
        }
        pos = r.span.end;
    }
    out.push_str(&text[pos..]);

    Ok(Rewrite {
        text: out,
        references,
        fetched,
    })
}

/// First configured host that appears anywhere in `text`, as a one-line notice.
pub fn host_notice(name: &str, text: &str, hosts: &[String]) -> Option<String> {
    hosts
        .iter()
        .find(|h| !h.is_empty() && text.contains(h.as_str()))
        .map(|h| format!("{} contains {}", name, h))
}

/// Rewrites documents against one cache with one fetcher.
pub struct Rewriter<'a> {
    cache: &'a ImageCache,
    fetcher: &'a dyn Fetcher,
    notice_hosts: &'a [String],
}

impl<'a> Rewriter<'a> {
    pub fn new(cache: &'a ImageCache, fetcher: &'a dyn Fetcher, notice_hosts: &'a [String]) -> Self {
        Self {
            cache,
            fetcher,
            notice_hosts,
        }
    }

    pub fn cache(&self) -> &ImageCache {
        self.cache
    }

    /// Rewrites the document at `path` in place.
    ///
    /// A host notice, if any, is written to `out` before any fetching. The file
    /// is written back only when it had at least one reference and its text changed.
    pub fn rewrite_document(&self, path: &Path, out: &mut dyn Write) -> Result<RewriteOutcome> {
        let original = fs::read_to_string(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;

        if let Some(notice) = host_notice(&display_name(path), &original, self.notice_hosts) {
            writeln!(out, "{}", notice)?;
        }

        let base_dir = document_dir(path);
        let rewrite = rewrite_text(&original, base_dir, self.cache, self.fetcher)
            .with_context(|| format!("failed to rewrite {}", path.display()))?;

        let written = rewrite.references > 0 && rewrite.text != original;
        if written {
            fs::write(path, &rewrite.text)
                .with_context(|| format!("failed to write document: {}", path.display()))?;
        }
        tracing::debug!(
            path = %path.display(),
            references = rewrite.references,
            fetched = rewrite.fetched,
            written,
            "document processed"
        );

        Ok(RewriteOutcome {
            path: path.to_path_buf(),
            rewrite,
            written,
        })
    }
}

/// Lists the references in `path` with their status in `cache`, without fetching or writing.
pub fn scan_document(path: &Path, cache: &ImageCache) -> Result<Vec<ScanEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;
    Ok(reference::find_all(&text)
        .into_iter()
        .map(|r| {
            let cache_name = cache_filename(&r.target);
            let cached = cache_name.as_deref().is_some_and(|n| cache.contains(n));
            ScanEntry {
                reference: r,
                cache_name,
                cached,
            }
        })
        .collect())
}

/// File name used in notices (falls back to the full path).
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn document_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Writes a fixed body for every target and records what was asked for.
    #[derive(Default)]
    struct RecordingFetcher {
        calls: RefCell<Vec<String>>,
    }

    impl Fetcher for RecordingFetcher {
        fn fetch(&self, target: &str, _base_dir: &Path, dest: &Path) -> Result<u64> {
            self.calls.borrow_mut().push(target.to_string());
            fs::write(dest, target.as_bytes())?;
            Ok(target.len() as u64)
        }
    }

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch(&self, target: &str, _base_dir: &Path, _dest: &Path) -> Result<u64> {
            anyhow::bail!("unreachable: {}", target)
        }
    }

    fn setup() -> (tempfile::TempDir, ImageCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::in_dir(dir.path(), "images");
        (dir, cache)
    }

    #[test]
    fn no_references_is_unchanged() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let text = "# Title\n\nNo pictures, just a [link](http://x/y.png).\n";
        let rw = rewrite_text(text, dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(rw.text, text);
        assert_eq!(rw.references, 0);
        assert!(!rw.updated());
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[test]
    fn uncached_reference_is_fetched_and_rewritten() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let rw = rewrite_text("see ![cat](http://x/cat.png) here", dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(rw.text, "see ![cat](images/cat.png) here");
        assert!(rw.updated());
        assert!(cache.contains("cat.png"));
        assert_eq!(*fetcher.calls.borrow(), vec!["http://x/cat.png".to_string()]);
    }

    #[test]
    fn cached_reference_is_rewritten_without_fetch() {
        let (dir, cache) = setup();
        cache.ensure_dir().unwrap();
        fs::write(cache.local_path("a.png"), b"old").unwrap();
        let fetcher = RecordingFetcher::default();

        let rw = rewrite_text("![x](https://cdn/a.png)", dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(rw.text, "![x](images/a.png)");
        assert_eq!(rw.references, 1);
        assert!(!rw.updated());
        assert!(fetcher.calls.borrow().is_empty());
        assert_eq!(fs::read(cache.local_path("a.png")).unwrap(), b"old");
    }

    #[test]
    fn cached_names_are_used_verbatim() {
        let (dir, cache) = setup();
        cache.ensure_dir().unwrap();
        let fetcher = RecordingFetcher::default();
        for name in ["_logo.png", "my__pic.png", ".hidden.png", "two words.png"] {
            fs::write(cache.local_path(name), b"cached").unwrap();
            let text = format!("![x](images/{})", name);

            let rw = rewrite_text(&text, dir.path(), &cache, &fetcher).unwrap();
            assert_eq!(rw.text, text, "{}", name);
            assert!(!rw.updated(), "{}", name);
        }
        assert!(fetcher.calls.borrow().is_empty());
        let mut entries: Vec<_> = fs::read_dir(cache.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec![".hidden.png", "_logo.png", "my__pic.png", "two words.png"]);
    }

    #[test]
    fn uncached_name_is_stored_verbatim() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let rw = rewrite_text("![x](http://x/_logo.png)", dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(rw.text, "![x](images/_logo.png)");
        assert!(rw.updated());
        assert!(cache.contains("_logo.png"));

        let again = rewrite_text(&rw.text, dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(again.text, rw.text);
        assert!(!again.updated());
    }

    #[test]
    fn multiple_references_in_order() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let rw = rewrite_text(
            "![a](http://x/1.png) ![b](http://x/2.png)",
            dir.path(),
            &cache,
            &fetcher,
        )
        .unwrap();
        assert_eq!(rw.text, "![a](images/1.png) ![b](images/2.png)");
        assert_eq!(rw.fetched, 2);
        assert_eq!(
            *fetcher.calls.borrow(),
            vec!["http://x/1.png".to_string(), "http://x/2.png".to_string()]
        );
        assert!(cache.contains("1.png"));
        assert!(cache.contains("2.png"));
    }

    #[test]
    fn same_basename_fetched_once() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let rw = rewrite_text(
            "![a](http://one/p.png)\n![b](http://two/p.png)\n",
            dir.path(),
            &cache,
            &fetcher,
        )
        .unwrap();
        assert_eq!(rw.text, "![a](images/p.png)\n![b](images/p.png)\n");
        assert_eq!(rw.references, 2);
        assert_eq!(rw.fetched, 1);
    }

    #[test]
    fn unusable_target_left_as_is() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let rw = rewrite_text("![a](https://host/) ![b]()", dir.path(), &cache, &fetcher).unwrap();
        assert_eq!(rw.text, "![a](https://host/) ![b]()");
        assert_eq!(rw.references, 2);
        assert!(!rw.updated());
    }

    #[test]
    fn fetch_failure_propagates() {
        let (dir, cache) = setup();
        let err = rewrite_text("![a](http://down/a.png)", dir.path(), &cache, &FailingFetcher)
            .unwrap_err();
        assert!(err.to_string().contains("http://down/a.png"));
    }

    #[test]
    fn document_rewrite_is_idempotent() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let doc = dir.path().join("post.md");
        fs::write(&doc, "![a](http://x/1.png)\ntext\n").unwrap();
        let rewriter = Rewriter::new(&cache, &fetcher, &[]);
        let mut out: Vec<u8> = Vec::new();

        let first = rewriter.rewrite_document(&doc, &mut out).unwrap();
        assert!(first.updated());
        assert!(first.written);
        let after_first = fs::read_to_string(&doc).unwrap();
        assert_eq!(after_first, "![a](images/1.png)\ntext\n");

        let second = rewriter.rewrite_document(&doc, &mut out).unwrap();
        assert!(!second.updated());
        assert!(!second.written);
        assert_eq!(fs::read_to_string(&doc).unwrap(), after_first);
        assert_eq!(fetcher.calls.borrow().len(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_document_is_not_written() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let doc = dir.path().join("empty.md");
        fs::write(&doc, "").unwrap();
        let outcome = Rewriter::new(&cache, &fetcher, &[])
            .rewrite_document(&doc, &mut Vec::<u8>::new())
            .unwrap();
        assert!(!outcome.written);
        assert!(!outcome.updated());
    }

    #[test]
    fn missing_document_is_an_error() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let err = Rewriter::new(&cache, &fetcher, &[])
            .rewrite_document(&dir.path().join("nope.md"), &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(err.to_string().contains("nope.md"));
    }

    #[test]
    fn host_notice_once_per_document() {
        let (dir, cache) = setup();
        let fetcher = RecordingFetcher::default();
        let doc = dir.path().join("gallery.md");
        fs::write(
            &doc,
            "![a](https://i.imgur.com/a.png) ![b](https://i.imgur.com/b.png) imgur\n",
        )
        .unwrap();
        let hosts = vec!["imgur".to_string()];
        let mut out: Vec<u8> = Vec::new();
        Rewriter::new(&cache, &fetcher, &hosts)
            .rewrite_document(&doc, &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "gallery.md contains imgur\n");
    }

    #[test]
    fn host_notice_matching() {
        let hosts = vec!["imgur".to_string(), "flickr".to_string()];
        assert_eq!(
            host_notice("a.md", "pics on flickr and imgur", &hosts).as_deref(),
            Some("a.md contains imgur")
        );
        assert_eq!(host_notice("a.md", "nothing here", &hosts), None);
        assert_eq!(host_notice("a.md", "anything", &[String::new()]), None);
    }

    #[test]
    fn scan_reports_cache_status() {
        let (dir, cache) = setup();
        cache.ensure_dir().unwrap();
        fs::write(cache.local_path("have.png"), b"x").unwrap();
        let doc = dir.path().join("doc.md");
        fs::write(&doc, "![a](http://x/have.png) ![b](http://x/want.png) ![c](http://x/)").unwrap();

        let entries = scan_document(&doc, &cache).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].cached);
        assert!(!entries[1].cached);
        assert_eq!(entries[1].cache_name.as_deref(), Some("want.png"));
        assert_eq!(entries[2].cache_name, None);
        assert!(!cache.contains("want.png"));
    }

    #[test]
    fn document_dir_defaults_to_current() {
        assert_eq!(document_dir(Path::new("post.md")), Path::new("."));
        assert_eq!(document_dir(Path::new("docs/post.md")), Path::new("docs"));
    }
}
