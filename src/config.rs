//! Layered settings: built-in defaults, then an optional TOML file, then
//! `CSE_BRIDGE__SECTION__KEY` environment variables.

use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use reqwest::Url;
use serde::Deserialize;

use crate::error::{BridgeError, Result};

pub const ENV_PREFIX: &str = "CSE_BRIDGE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub upstream: UpstreamSettings,
    pub cache: CacheSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamSettings {
    /// API root; endpoint names are appended to it.
    pub base_url: String,
    /// Host serving report PDFs.
    pub cdn_base: String,
    /// Sent as Origin/Referer.
    pub site_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.cse.lk/api/".into(),
            cdn_base: "https://cdn.cse.lk/".into(),
            site_url: "https://www.cse.lk".into(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl_secs: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub name: String,
    /// Populate the symbol directory in the background at startup.
    pub warm_up: bool,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { name: "cse-mcp-server".into(), warm_up: true, log_filter: "info".into() }
    }
}

fn http_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| BridgeError::Config(format!("{key}: '{raw}' is not a URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(BridgeError::Config(format!("{key}: unsupported scheme '{other}'"))),
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        http_url("upstream.base_url", &self.upstream.base_url)?;
        http_url("upstream.site_url", &self.upstream.site_url)?;
        self.cdn_base()?;
        if self.upstream.timeout_secs == 0 {
            return Err(BridgeError::Config("upstream.timeout_secs must be positive".into()));
        }
        if self.cache.ttl_secs == 0 {
            return Err(BridgeError::Config("cache.ttl_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn cdn_base(&self) -> Result<Url> {
        http_url("upstream.cdn_base", &self.upstream.cdn_base)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}
