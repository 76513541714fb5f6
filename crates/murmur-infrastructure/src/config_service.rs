//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` and caches it.

use murmur_core::config::RootConfig;
use murmur_core::error::{ChatError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::paths::MurmurPaths;

/// Configuration service that loads and caches the root configuration.
///
/// The file is read lazily on first access. A missing file yields the
/// defaults; an unreadable one is logged and also yields the defaults.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit config path; `None` means the platform default
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `~/.config/murmur/config.toml`.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service reading a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            RootConfig::default()
        });

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Reads the config file, bypassing the cache.
    ///
    /// Returns the defaults when the file is missing or empty.
    pub fn load(&self) -> Result<RootConfig> {
        let path = self.config_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(RootConfig::default());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// Writes `config` to disk and refreshes the cache.
    ///
    /// Uses a temporary file + atomic rename so readers never see a partial file.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        let path = self.config_path()?;
        write_atomically(&path, &toml::to_string_pretty(config)?)?;

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(config.clone());
        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => MurmurPaths::config_file().map_err(|e| ChatError::config(e.to_string())),
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| ChatError::io(format!("{} has no parent directory", path.display())))?;
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ChatError::io(format!("{} has no file name", path.display())))?;
    let tmp_path = parent.join(format!(".{}.tmp", file_name.to_string_lossy()));

    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
