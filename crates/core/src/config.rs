//! Application configuration loaded from `~/.config/coverfinder/config.toml`
//! and `COVERFINDER_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Upstream TheGamesDB API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.thegamesdb.net/v1";
/// Minimum spacing between two upstream dispatches, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 1000;
/// Upper bound on a single upstream request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = "coverfinder";
const CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "COVERFINDER";
const DOWNLOAD_SUBDIR: &str = "coverfinder";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# coverfinder configuration
#
# Every key may also be set through the environment, e.g. COVERFINDER_API_KEY.

api_base_url = "https://api.thegamesdb.net/v1"

# Personal key from https://api.thegamesdb.net/key.php
api_key = ""

throttle_ms = 1000
request_timeout_secs = 30

# Directory holding platform icons (platforms/<alias>.png, no-cover.png).
# assets_dir = "/usr/share/coverfinder"

# Where downloaded covers are saved (default: <Downloads>/coverfinder).
# download_dir = "/home/me/covers"
"#;

/// Runtime settings for the API client and the terminal front-end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL every endpoint path is appended to.
    pub api_base_url: String,
    /// TheGamesDB API key sent as the `apikey` query parameter.
    pub api_key: String,
    /// Minimum gap between dispatches, in milliseconds.
    pub throttle_ms: u64,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
    /// Optional root for local platform icons.
    pub assets_dir: Option<PathBuf>,
    /// Target directory for downloaded covers.
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: String::new(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            assets_dir: None,
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location plus the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) layered under the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(path.as_ref(), Environment::with_prefix(ENV_PREFIX))
    }

    /// Environment values stay strings; numeric fields convert on deserialize.
    fn load_layered(path: &Path, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("failed to parse configuration")?;
        Ok(config.sanitized())
    }

    /// Gap enforced by the throttle gate.
    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Bound applied to every HTTP request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Directory covers are downloaded into.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::download_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DOWNLOAD_SUBDIR)
        })
    }

    fn sanitized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        if self.api_base_url.is_empty() {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        }
        self.api_key = self.api_key.trim().to_string();
        self
    }
}

/// Default configuration file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))?;
    info!("wrote default configuration to {}", path.display());
    Ok(())
}
