use crate::errors::DbError;
use crate::query::{MAX_LIMIT, PageDefaults};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tourlite.toml";

/// Service settings. Precedence: explicit (CLI) > env > config file > defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Write-ahead log backing the collection; `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_retention: Option<usize>,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            log_dir: None,
            log_level: None,
            log_retention: None,
            default_page_size: PageDefaults::default().limit,
            max_page_size: MAX_LIMIT,
        }
    }
}

impl ServiceConfig {
    /// # Errors
    /// Returns `DbError::Config` when the text is not valid TOML for this struct.
    pub fn from_toml_str(s: &str) -> Result<Self, DbError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path` (or `./tourlite.toml` if present), then apply `TOURLITE_*` env vars.
    ///
    /// # Errors
    /// Returns an error if an explicitly named file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, DbError> {
        let mut cfg = match path {
            Some(p) => Self::from_toml_str(&std::fs::read_to_string(p)?)?,
            None => {
                let local = PathBuf::from(CONFIG_FILE);
                match std::fs::read_to_string(&local) {
                    Ok(s) => Self::from_toml_str(&s)?,
                    Err(_) => Self::default(),
                }
            }
        };
        cfg.apply_env_with(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Overlay values from an env-like lookup. Unparseable numbers are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(s) = lookup("TOURLITE_DATA") {
            self.data_path = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("TOURLITE_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(s));
        }
        if let Some(s) = lookup("TOURLITE_LOG_LEVEL") {
            self.log_level = Some(s);
        }
        if let Some(n) = lookup("TOURLITE_LOG_RETENTION").and_then(|s| s.parse().ok()) {
            self.log_retention = Some(n);
        }
        if let Some(n) = lookup("TOURLITE_PAGE_SIZE").and_then(|s| s.parse().ok()) {
            self.default_page_size = n;
        }
        if let Some(n) = lookup("TOURLITE_MAX_PAGE_SIZE").and_then(|s| s.parse().ok()) {
            self.max_page_size = n;
        }
    }

    /// Paging limits for the query translator, clamped to sane bounds.
    #[must_use]
    pub fn page_defaults(&self) -> PageDefaults {
        let max_limit = self.max_page_size.clamp(1, MAX_LIMIT);
        PageDefaults { limit: self.default_page_size.clamp(1, max_limit), max_limit }
    }
}
