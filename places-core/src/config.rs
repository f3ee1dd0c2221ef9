use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::cache::CachePolicy;

pub const SERVER_URL_ENV: &str = "PLACES_SERVER_URL";
pub const CLIENT_URL_ENV: &str = "PLACES_CLIENT_URL";

/// Fetch cache timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a fetched result counts as fresh. `0` revalidates on every read.
    pub stale_after_secs: u64,
    /// Seconds an unused result is kept before it is dropped.
    pub evict_after_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: 0,
            evict_after_secs: 300,
        }
    }
}

impl From<CacheConfig> for CachePolicy {
    fn from(cfg: CacheConfig) -> Self {
        CachePolicy {
            stale_after: Duration::from_secs(cfg.stale_after_secs),
            evict_after: Duration::from_secs(cfg.evict_after_secs),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// server_url = "http://localhost:8080"
/// client_url = "http://localhost:3000"
///
/// [cache]
/// stale_after_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Base URL of the places backend.
    pub server_url: Option<String>,

    /// Origin this client presents itself as; advertised in the CORS headers.
    pub client_url: Option<String>,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Connection settings resolved from a [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: Url,
    pub server_url: String,
    pub client_url: Option<String>,
}

impl Config {
    /// The settings file in the platform config directory, or defaults when there is none.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// `config.toml` under the platform config directory for `places-cli`.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "my-places", "places-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Invalid settings in {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err).with_context(|| format!("Cannot read {}", path.display())),
        }
    }

    /// Write the settings to `path`, creating missing directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Cannot write {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Cannot serialize settings to TOML")
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay `PLACES_SERVER_URL` / `PLACES_CLIENT_URL` as returned by `lookup`.
    /// Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(server) = non_empty(SERVER_URL_ENV) {
            self.server_url = Some(server);
        }
        if let Some(client) = non_empty(CLIENT_URL_ENV) {
            self.client_url = Some(client);
        }
        self
    }

    /// Validate and return what the HTTP client needs.
    pub fn api_settings(&self) -> Result<ApiSettings> {
        let server_url = self.server_url.as_deref().ok_or_else(|| {
            anyhow!(
                "No server URL configured.\n\
                 Hint: run `places configure` or set {SERVER_URL_ENV}."
            )
        })?;

        let base_url = Url::parse(server_url)
            .with_context(|| format!("Invalid server URL '{server_url}'"))?;

        Ok(ApiSettings {
            base_url,
            server_url: server_url.to_string(),
            client_url: self.client_url.clone(),
        })
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache.into()
    }
}
