//! 客户端配置
//!
//! 优先级：本地存储覆盖 > 编译期环境变量 > 默认值。

use std::time::Duration;

use tracing::{Level, warn};

use crate::session::KeyValueStorage;

pub const STORAGE_API_URL_KEY: &str = "plantshout_api_url";

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_level: Level::INFO,
        }
    }
}

/// Raw override values, as strings, before validation.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides<'a> {
    pub api_url: Option<&'a str>,
    pub poll_secs: Option<&'a str>,
    pub log_level: Option<&'a str>,
}

impl ConfigOverrides<'static> {
    /// Values baked in at build time.
    pub fn from_build_env() -> Self {
        Self {
            api_url: option_env!("PLANTSHOUT_API_URL"),
            poll_secs: option_env!("PLANTSHOUT_POLL_SECS"),
            log_level: option_env!("PLANTSHOUT_LOG"),
        }
    }
}

impl ConfigOverrides<'_> {
    fn parsed_log_level(&self) -> Option<Level> {
        self.log_level.and_then(|raw| raw.trim().parse().ok())
    }
}

impl ClientConfig {
    /// Installs logging at the build-time level, then loads the config, so
    /// warnings raised while loading reach the console.
    pub fn bootstrap(storage: &dyn KeyValueStorage, install_logging: impl FnOnce(Level)) -> Self {
        let level = ConfigOverrides::from_build_env()
            .parsed_log_level()
            .unwrap_or(Level::INFO);
        install_logging(level);
        Self::load(storage)
    }

    /// Build-time overrides, then the API URL remembered in `storage`.
    pub fn load(storage: &dyn KeyValueStorage) -> Self {
        let mut config = Self::default().with_overrides(&ConfigOverrides::from_build_env());
        match storage.get(STORAGE_API_URL_KEY) {
            Ok(Some(url)) => config.set_api_base_url(&url),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "could not read stored API url"),
        }
        config
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides<'_>) -> Self {
        if let Some(url) = overrides.api_url {
            self.set_api_base_url(url);
        }
        if let Some(raw) = overrides.poll_secs {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval = Duration::from_secs(secs),
                _ => warn!(value = raw, "ignoring invalid poll interval"),
            }
        }
        if let Some(raw) = overrides.log_level {
            match overrides.parsed_log_level() {
                Some(level) => self.log_level = level,
                None => warn!(value = raw, "ignoring invalid log level"),
            }
        }
        self
    }

    fn set_api_base_url(&mut self, url: &str) {
        let url = url.trim().trim_end_matches('/');
        if url.starts_with("http://") || url.starts_with("https://") {
            self.api_base_url = url.to_string();
        } else {
            warn!(value = url, "ignoring invalid API url");
        }
    }
}
