use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;

/// Port the backend listens on in development.
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Explicit base URL override.
pub const API_URL_ENV: &str = "NETCARD_API_URL";
/// Dev server `host:port` handed to the app by its runtime (e.g. `192.168.1.5:8081`).
pub const DEV_HOST_ENV: &str = "NETCARD_DEV_HOST";

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("netcard")
        .join("config.json")
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NetcardConfig {
    pub api_url: Option<String>,
    pub debug_logging: bool,
}

impl NetcardConfig {
    pub fn path() -> PathBuf {
        default_config_path()
    }

    /// Load the config file, falling back to defaults if it is missing or invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }
}

/// Pick the API base URL: explicit override, then the dev host with the
/// backend port, then localhost.
pub fn resolve_base_url(explicit: Option<&str>, dev_host: Option<&str>) -> String {
    if let Some(url) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    if let Some(host) = dev_host.and_then(dev_hostname) {
        return format!("http://{}:{}", host, DEFAULT_PORT);
    }
    DEFAULT_BASE_URL.to_string()
}

/// Hostname part of a `host:port` string, tolerating a scheme prefix.
fn dev_hostname(host_uri: &str) -> Option<&str> {
    let rest = host_uri
        .trim()
        .split_once("://")
        .map_or(host_uri.trim(), |(_, rest)| rest);
    let host = rest.split(['/', ':']).next()?;
    (!host.is_empty()).then_some(host)
}

static BASE_URL: LazyLock<String> = LazyLock::new(|| {
    let config = NetcardConfig::load();
    let explicit = std::env::var(API_URL_ENV).ok().or(config.api_url);
    let dev_host = std::env::var(DEV_HOST_ENV).ok();
    let url = resolve_base_url(explicit.as_deref(), dev_host.as_deref());
    log::info!("API base URL: {}", url);
    url
});

/// Base URL for this process. Resolved on first use and never re-evaluated.
pub fn base_url() -> &'static str {
    BASE_URL.as_str()
}
