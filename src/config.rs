use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

// ============================================================
// Config.toml
// ============================================================
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    #[serde(default = "default_urls_file")]
    pub urls_file: String,

    #[serde(default)]
    pub chromium_path: Option<String>,

    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Wait after each download round so the browser can finish writing files.
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    /// Download rounds before giving up on the remaining files; 0 keeps asking.
    #[serde(default)]
    pub max_rounds: usize,

    #[serde(default = "default_download_pause_ms")]
    pub download_pause_ms: u64,

    #[serde(default)]
    pub pause_jitter_ms: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Many yearbook hosts serve expired or self-signed certificates.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    #[serde(default)]
    pub disable_csv: bool,

    #[serde(default)]
    pub disable_img: bool,

    #[serde(default = "default_disable_htmlpage")]
    pub disable_htmlpage: bool,
}

fn default_download_dir() -> String {
    ".".to_string()
}
fn default_urls_file() -> String {
    "urls.json".to_string()
}
fn default_headless() -> bool {
    true
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string()
}
fn default_idle_timeout_secs() -> u64 {
    600
}
fn default_settle_secs() -> u64 {
    5
}
fn default_download_pause_ms() -> u64 {
    200
}
fn default_fetch_timeout_secs() -> u64 {
    60
}
fn default_accept_invalid_certs() -> bool {
    true
}
fn default_disable_htmlpage() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            urls_file: default_urls_file(),
            chromium_path: None,
            headless: default_headless(),
            user_agent: default_user_agent(),
            idle_timeout_secs: default_idle_timeout_secs(),
            settle_secs: default_settle_secs(),
            max_rounds: 0,
            download_pause_ms: default_download_pause_ms(),
            pause_jitter_ms: 0,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            accept_invalid_certs: default_accept_invalid_certs(),
            disable_csv: false,
            disable_img: false,
            disable_htmlpage: default_disable_htmlpage(),
        }
    }
}

impl Config {
    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            disable_csv: self.disable_csv,
            disable_img: self.disable_img,
            disable_htmlpage: self.disable_htmlpage,
            download_pause: Duration::from_millis(self.download_pause_ms),
            pause_jitter_ms: self.pause_jitter_ms,
        }
    }
}

/// Which capture paths the subpage processor may take.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub disable_csv: bool,
    pub disable_img: bool,
    pub disable_htmlpage: bool,
    pub download_pause: Duration,
    pub pause_jitter_ms: u64,
}

/// Debug builds resolve against the working directory, release builds
/// against the executable's directory.
pub fn get_base_path(relative: &str) -> PathBuf {
    if cfg!(debug_assertions) {
        env::current_dir()
            .map(|dir| dir.join(relative))
            .unwrap_or_else(|_| PathBuf::from(relative))
    } else {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(relative)))
            .unwrap_or_else(|| PathBuf::from(relative))
    }
}

pub fn load_config(explicit: Option<&Path>) -> Config {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => get_base_path("Config.toml"),
    };
    if !config_path.exists() {
        info!("No config at {}, using defaults", config_path.display());
        return Config::default();
    }
    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(cfg) => {
                info!("Loaded config {}", config_path.display());
                cfg
            }
            Err(e) => {
                warn!("Unable to parse {}: {}. Using defaults.", config_path.display(), e);
                Config::default()
            }
        },
        Err(e) => {
            warn!("Unable to read {}: {}. Using defaults.", config_path.display(), e);
            Config::default()
        }
    }
}
