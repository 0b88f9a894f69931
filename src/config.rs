use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Runtime settings, read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base address every relative API path is appended to (no trailing slash)
    pub api_url: String,
    pub page_size: u32,
    /// Optional `limit` sent with face searches
    pub search_limit: Option<u32>,
    /// Optional `threshold` sent with face searches, within 0..=1
    pub search_threshold: Option<f32>,
    /// Override for the directory holding the session database
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: None,
            search_threshold: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("IFOTO_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| {
                info!("IFOTO_API_URL not set, using default: {DEFAULT_API_URL}");
                DEFAULT_API_URL.to_string()
            });

        let page_size: u32 = try_load(&lookup, "IFOTO_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "IFOTO_PAGE_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let search_limit = try_load(&lookup, "IFOTO_SEARCH_LIMIT")?;
        let search_threshold: Option<f32> = try_load(&lookup, "IFOTO_SEARCH_THRESHOLD")?;
        if let Some(threshold) = search_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid {
                    key: "IFOTO_SEARCH_THRESHOLD",
                    reason: format!("{threshold} is outside 0..=1"),
                });
            }
        }

        let data_dir = lookup("IFOTO_DATA_DIR").map(PathBuf::from);

        Ok(Self {
            api_url,
            page_size,
            search_limit,
            search_threshold,
            data_dir,
        })
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        }),
    }
}
