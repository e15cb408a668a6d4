//! Fetch error type.

use thiserror::Error;

/// Error returned by a single image fetch (curl failure, HTTP error, or storage failure).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (bad URL, timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u32 },
    /// Disk write or rename failed (e.g. disk full, permission denied).
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}
