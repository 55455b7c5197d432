//! Global configuration loaded from `~/.config/rdvitals/config.toml`.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration for HTTP behavior and bulk downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdvitalsConfig {
    /// User-Agent sent on every request.
    pub user_agent: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds. Level packages can be large
    /// (audio + art), so this is generous.
    pub request_timeout_secs: u64,
    /// Maximum redirects to follow (Discord/Drive/Dropbox links redirect).
    pub max_redirects: u32,
    /// Maximum concurrent downloads in bulk fan-out.
    pub max_concurrent_downloads: usize,
}

impl Default for RdvitalsConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("rdvitals/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_secs: 15,
            request_timeout_secs: 3600,
            max_redirects: 10,
            max_concurrent_downloads: 8,
        }
    }
}

impl RdvitalsConfig {
    /// Build the HTTP options handed to the download/probe functions.
    pub fn http_options(&self) -> crate::http::HttpOptions {
        crate::http::HttpOptions {
            user_agent: self.user_agent.clone(),
            connect_timeout: std::time::Duration::from_secs(self.connect_timeout_secs),
            timeout: std::time::Duration::from_secs(self.request_timeout_secs),
            max_redirects: self.max_redirects,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rdvitals")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RdvitalsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RdvitalsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RdvitalsConfig = toml::from_str(&data)?;
    Ok(cfg)
}
