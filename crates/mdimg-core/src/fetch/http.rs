//! Single-stream HTTP GET into a cache file.

use super::{temp_path, FetchError};
use crate::config::FetchConfig;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Downloads `url` with one GET, writing to `dest.part` and renaming to `dest` on success.
/// Returns the number of bytes written. The partial file is removed on failure.
pub fn download_to_file(url: &str, dest: &Path, config: &FetchConfig) -> Result<u64, FetchError> {
    let part = temp_path(dest);
    let mut file = File::create(&part)?;
    let result = get_into(url, &mut file, config).and_then(|n| {
        file.sync_all()?;
        Ok(n)
    });
    drop(file);

    match result {
        Ok(n) => {
            fs::rename(&part, dest)?;
            tracing::debug!(url, bytes = n, dest = %dest.display(), "downloaded");
            Ok(n)
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}

fn get_into(url: &str, file: &mut File, config: &FetchConfig) -> Result<u64, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(&config.user_agent)?;
    easy.connect_timeout(Duration::from_secs(config.connect_timeout_secs))?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(Duration::from_secs(config.timeout_secs))?;

    let mut written: u64 = 0;
    let mut storage_err: Option<io::Error> = None;
    let mut transfer = easy.transfer();
    transfer.write_function(|data| match file.write_all(data) {
        Ok(()) => {
            written += data.len() as u64;
            Ok(data.len())
        }
        Err(e) => {
            tracing::warn!("image write failed: {}", e);
            storage_err = Some(e);
            Ok(0) // abort transfer
        }
    })?;
    let performed = transfer.perform();
    drop(transfer);

    if let Some(e) = storage_err {
        return Err(FetchError::Storage(e));
    }
    performed?;

    if is_http(url) {
        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Http {
                url: url.to_string(),
                status,
            });
        }
    }
    Ok(written)
}

fn is_http(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
