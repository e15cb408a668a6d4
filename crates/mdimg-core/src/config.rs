use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// HTTP fetch parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Upper bound in seconds for a whole image transfer.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 300,
            user_agent: concat!("mdimg/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/mdimg/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MdimgConfig {
    /// Cache directory name, relative to the directory being processed.
    pub cache_dir: String,
    /// Document extension (matched case-insensitively, without the dot).
    pub extension: String,
    /// Substrings that trigger a one-line notice when found in a document.
    pub notice_hosts: Vec<String>,
    /// Optional fetch settings; if missing, built-in defaults are used.
    pub fetch: Option<FetchConfig>,
}

impl Default for MdimgConfig {
    fn default() -> Self {
        Self {
            cache_dir: "images".to_string(),
            extension: "md".to_string(),
            notice_hosts: vec!["imgur".to_string()],
            fetch: None,
        }
    }
}

impl MdimgConfig {
    /// Fetch settings, falling back to defaults when the section is absent.
    pub fn fetch_config(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mdimg")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MdimgConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MdimgConfig> {
    if !path.exists() {
        let default_cfg = MdimgConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: MdimgConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}
