//! Reference target modeling and cache filename derivation.
//!
//! The cache filename is the target's final path segment, kept byte for byte
//! so a reference that already points into the cache maps onto the same file.

mod path;

pub use path::{basename_from_target, is_absolute_url};

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Derives the cache filename for an image reference target.
///
/// Takes the final path segment of `target` (query and fragment dropped) as is.
/// Returns `None` when that segment cannot name a file in the cache directory,
/// in which case the reference cannot be cached.
///
/// # Examples
///
/// - `cache_filename("https://i.imgur.com/abc.png")` → `Some("abc.png")`
/// - `cache_filename("images/_logo.png")` → `Some("_logo.png")`
/// - `cache_filename("https://example.com/")` → `None`
pub fn cache_filename(target: &str) -> Option<String> {
    basename_from_target(target).filter(|name| is_storable_name(name))
}

/// True if `name` can be a single file directly inside a directory on Linux.
pub fn is_storable_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name.len() <= NAME_MAX
        && !name.contains(['\0', '/', '\\'])
}
