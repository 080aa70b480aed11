//! # Application Configuration
//!
//! Loads the settings for a sync run from a YAML file, layered under
//! environment variables.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults ([`AppConfig::default`])
//! 2. The YAML file: `--config PATH`, else the first of `./config.yaml` and
//!    `/config/config.yaml`
//! 3. Environment variables prefixed with `BAZARR_SYNC_`, nested keys joined
//!    with `__` (e.g. `BAZARR_SYNC_SCHEDULE__ENABLED=true`)
//!
//! Command-line flags are applied last through [`ConfigOverrides`].
//!
//! A missing config file is an error; so is a missing API token.
//!
//! ## Example
//!
//! ```yaml
//! address: 192.168.1.10
//! port: 6767
//! protocol: http
//! api_token: 0123456789abcdef
//! schedule:
//!   enabled: true
//!   cron_expression: "0 3 * * *"
//!   timezone: Europe/Berlin
//! cache:
//!   enabled: true
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "BAZARR_SYNC_";

/// Places searched for `config.yaml` when no path is given, in order.
pub const CONFIG_SEARCH_PATHS: &[&str] = &["config.yaml", "/config/config.yaml"];

/// Settings for one invocation.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Host name or IP of the Bazarr server. When it contains a `/` it is
    /// treated as `host/path` and the port is not appended.
    pub address: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: String,
    /// `http` or `https`
    pub protocol: String,
    #[serde(alias = "apitoken", alias = "api_key")]
    pub api_token: String,
    pub schedule: ScheduleConfig,
    pub cache: CacheConfig,
    #[serde(alias = "syncoptions")]
    pub sync_options: SyncOptionsConfig,
    /// File the settings were read from, when loaded from disk.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    #[serde(alias = "syncmovies")]
    pub sync_movies: bool,
    #[serde(alias = "syncshows")]
    pub sync_shows: bool,
    /// Standard five-field cron expression.
    #[serde(alias = "cronexpression")]
    pub cron_expression: String,
    /// IANA timezone name the cron expression is evaluated in.
    pub timezone: String,
    /// Fire once immediately before waiting for the first scheduled time.
    #[serde(alias = "runinitial")]
    pub run_initial: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sync_movies: true,
            sync_shows: true,
            cron_expression: "0 1 * * 0".to_string(),
            timezone: "UTC".to_string(),
            run_initial: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    #[serde(alias = "moviescache")]
    pub movies_cache: PathBuf,
    #[serde(alias = "showscache")]
    pub shows_cache: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            movies_cache: PathBuf::from("movies-cache"),
            shows_cache: PathBuf::from("shows-cache"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncOptionsConfig {
    #[serde(alias = "goldensection")]
    pub golden_section: bool,
    #[serde(alias = "noframeratefix")]
    pub no_framerate_fix: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: "6767".to_string(),
            protocol: "http".to_string(),
            api_token: String::new(),
            schedule: ScheduleConfig::default(),
            cache: CacheConfig::default(),
            sync_options: SyncOptionsConfig::default(),
            source: None,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field(
                "api_token",
                &redact_if_sensitive("api_token", &self.api_token),
            )
            .field("schedule", &self.schedule)
            .field("cache", &self.cache)
            .field("sync_options", &self.sync_options)
            .field("source", &self.source)
            .finish()
    }
}

/// Flag values from the command line. `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub golden_section: Option<bool>,
    pub no_framerate_fix: Option<bool>,
    pub use_cache: Option<bool>,
    pub schedule: Option<bool>,
    pub run_initial: Option<bool>,
}

impl AppConfig {
    /// Find the config file: the explicit path if given, otherwise the first
    /// entry of [`CONFIG_SEARCH_PATHS`] that exists.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(Error::ConfigNotFound(path.display().to_string()))
            };
        }

        CONFIG_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                Error::ConfigNotFound(format!(
                    "no config.yaml in {}; pass --config or place the file next to bazarr-sync",
                    CONFIG_SEARCH_PATHS.join(" or ")
                ))
            })
    }

    /// Layered configuration sources for the given file.
    ///
    /// Defaults come from `#[serde(default)]` rather than a serialized
    /// provider so that legacy key aliases never collide with default keys.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Locate, read and validate the configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::locate(explicit)?;
        let mut config = Self::from_figment(&Self::figment(&path))?;
        config.source = Some(path);
        Ok(config)
    }

    /// Extract and validate from an already assembled figment.
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line flags on top of the loaded values.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(value) = overrides.golden_section {
            self.sync_options.golden_section = value;
        }
        if let Some(value) = overrides.no_framerate_fix {
            self.sync_options.no_framerate_fix = value;
        }
        if let Some(value) = overrides.use_cache {
            self.cache.enabled = value;
        }
        if let Some(value) = overrides.schedule {
            self.schedule.enabled = value;
        }
        if let Some(value) = overrides.run_initial {
            self.schedule.run_initial = value;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(Error::Config(
                "api_token is required (Bazarr > Settings > General > Security)".to_string(),
            ));
        }

        if self.address.trim().is_empty() {
            return Err(Error::Config("address is required".to_string()));
        }

        match self.protocol.to_ascii_lowercase().as_str() {
            "http" | "https" => {}
            other => {
                return Err(Error::Config(format!(
                    "protocol must be http or https, got '{}'",
                    other
                )))
            }
        }

        if !self.address.contains('/') && self.port.parse::<u16>().is_err() {
            return Err(Error::Config(format!(
                "port must be a number between 1 and 65535, got '{}'",
                self.port
            )));
        }

        if self.schedule.enabled && self.schedule.cron_expression.trim().is_empty() {
            return Err(Error::Config(
                "schedule.cron_expression is required when scheduling is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Root URL of the Bazarr server, without a trailing slash.
    pub fn base_url(&self) -> String {
        let protocol = self.protocol.to_ascii_lowercase();
        let address = self.address.trim().trim_end_matches('/');
        if address.contains('/') {
            format!("{}://{}", protocol, address)
        } else {
            format!("{}://{}:{}", protocol, address, self.port.trim())
        }
    }

    /// Base for API endpoints, always ending in `/api/`.
    pub fn api_url(&self) -> String {
        format!("{}/api/", self.base_url())
    }
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Number(n) => n.to_string(),
        Port::Text(s) => s,
    })
}
