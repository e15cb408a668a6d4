//! Basename extraction from a reference target.

/// True if `target` parses as an absolute URL with a scheme (e.g. `https://...`).
///
/// Single-letter schemes are rejected so Windows paths like `C:\x.png` stay paths.
pub fn is_absolute_url(target: &str) -> bool {
    match url::Url::parse(target) {
        Ok(u) => u.scheme().len() > 1,
        Err(_) => false,
    }
}

/// Extracts the final path segment of `target` for use as a cache filename.
///
/// Absolute URLs use the URL path (query and fragment are not part of it).
/// Anything else is treated as a plain path: `?query` and `#fragment` are cut
/// and the last `/` or `\` separated segment is returned.
///
/// Returns `None` if the path is empty or ends in a separator.
pub fn basename_from_target(target: &str) -> Option<String> {
    let target = target.trim();
    if is_absolute_url(target) {
        let parsed = url::Url::parse(target).ok()?;
        let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
        return non_reserved(segment);
    }

    let path = target
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let segment = path.rsplit(['/', '\\']).next()?;
    non_reserved(segment)
}

fn non_reserved(segment: &str) -> Option<String> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
