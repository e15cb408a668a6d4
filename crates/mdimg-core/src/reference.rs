//! Image reference recognition.
//!
//! A reference is `!`, a bracketed alt text and an immediately following
//! parenthesized target: `![alt](target)`. Neither part may span a line.
//! The target may contain balanced parentheses one level deep
//! (`File:A_(b).png`); an unbalanced `(` inside a target prevents the match.
//! Only the target is captured; the alt text is discarded.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Embedded-image pattern. The alt text is non-greedy and the target stops at
/// the first unbalanced `)`, so several references on one line match separately.
static IMAGE_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[.*?\]\(((?:[^()\n]|\([^()\n]*\))*)\)").expect("image pattern is valid")
});

/// One embedded-image occurrence in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Byte span of the captured target within the scanned text.
    pub span: Range<usize>,
    /// Captured target (URL or path), exactly as written.
    pub target: String,
}

/// Finds the first reference starting at or after byte offset `from`.
pub fn find_from(text: &str, from: usize) -> Option<ImageRef> {
    if from > text.len() {
        return None;
    }
    let caps = IMAGE_REF_PATTERN.captures_at(text, from)?;
    let target = caps.get(1)?;
    Some(ImageRef {
        span: target.range(),
        target: target.as_str().to_string(),
    })
}

/// Lists every reference in `text`, left to right.
///
/// Scanning resumes right after each captured target, the same way the
/// rewriter walks a document, so the result matches what a rewrite would touch.
pub fn find_all(text: &str) -> Vec<ImageRef> {
    let mut refs = Vec::new();
    let mut pos = 0;
    while let Some(r) = find_from(text, pos) {
        pos = r.span.end;
        refs.push(r);
    }
    refs
}
