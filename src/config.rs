//! Storage locations shared by the disk and relocation components.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Environment variable holding the relocation storage root.
pub const STORAGE_ROOT_VAR: &str = "UPLOAD_STORAGE_ROOT";
/// Environment variable holding the disk storage directory.
pub const LOCAL_DIR_VAR: &str = "UPLOAD_LOCAL_DIR";
/// Disk storage directory used when none is configured.
pub const DEFAULT_LOCAL_DIR: &str = "uploads";

/// Filesystem locations used by upload components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Base directory under which relocated files are placed.
    pub storage_root: PathBuf,
    /// Base directory used by disk storage.
    pub local_storage_dir: PathBuf,
}

impl UploadConfig {
    /// Creates a configuration with the default local storage directory.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            local_storage_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
        }
    }

    /// Overrides the disk storage directory.
    pub fn with_local_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_storage_dir = dir.into();
        self
    }

    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_root = lookup(STORAGE_ROOT_VAR).ok_or_else(|| ConfigError::MissingVar {
            name: STORAGE_ROOT_VAR.to_owned(),
        })?;

        let mut config = Self::new(storage_root);
        if let Some(local) = lookup(LOCAL_DIR_VAR) {
            config.local_storage_dir = PathBuf::from(local);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that both locations are non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_empty(&self.storage_root, STORAGE_ROOT_VAR)?;
        check_non_empty(&self.local_storage_dir, LOCAL_DIR_VAR)
    }
}

fn check_non_empty(path: &Path, name: &str) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::EmptyPath {
            name: name.to_owned(),
        });
    }
    Ok(())
}
