//! Search configuration via `kbsearch.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. Edit the file and restart to change settings; the
//! index is rebuilt at startup anyway.

use kbsearch_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "kbsearch.toml";

/// Default preview time-to-live: 30 minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30 * 60;

/// Search configuration loaded from `kbsearch.toml`.
///
/// # Example
///
/// ```toml
/// cache_enabled = true
/// cache_ttl_secs = 1800
/// flush_cache_on_startup = false
/// parallel_search = true
/// parallel_rebuild = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cache previews in front of the document store. When off, every
    /// preview read goes to the store.
    pub cache_enabled: bool,
    /// Seconds a cached preview stays fresh.
    pub cache_ttl_secs: u64,
    /// Drop every cached preview before the startup rebuild.
    pub flush_cache_on_startup: bool,
    /// Fan per-term lookups and preview resolution out over the rayon pool.
    pub parallel_search: bool,
    /// Replay entries in parallel during the startup rebuild.
    pub parallel_rebuild: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            flush_cache_on_startup: false,
            parallel_search: true,
            parallel_rebuild: true,
        }
    }
}

impl SearchConfig {
    /// Preview time-to-live as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Check field combinations that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error if caching is enabled with a zero TTL.
    pub fn validate(&self) -> Result<()> {
        if self.cache_enabled && self.cache_ttl_secs == 0 {
            return Err(Error::invalid_config(
                "cache_ttl_secs must be greater than 0 when cache_enabled = true",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# kbsearch configuration
#
# Preview cache in front of the document store (default: true).
# When false, every preview is read from the store.
cache_enabled = true

# Seconds a cached preview stays fresh (default: 1800 = 30 minutes).
cache_ttl_secs = 1800

# Drop all cached previews before the startup rebuild (default: false).
flush_cache_on_startup = false

# Run per-term lookups in parallel (default: true).
parallel_search = true

# Replay stored entries in parallel when rebuilding the index (default: true).
parallel_rebuild = true
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::SerializationError(msg) => Error::SerializationError(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
