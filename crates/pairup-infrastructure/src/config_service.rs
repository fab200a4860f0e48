//! Configuration service implementation.
//!
//! Loads and updates the root configuration in `pairup.toml`.

use crate::paths::PairUpPaths;
use crate::storage::AtomicTomlFile;
use pairup_core::Result;
use pairup_core::config::{RootConfig, StorageBackend};
use std::path::{Path, PathBuf};

/// Reads and writes `pairup.toml`.
///
/// A missing or empty file reads as [`RootConfig::default`]; nothing is
/// written until a setting is changed.
pub struct ConfigService {
    file: AtomicTomlFile<RootConfig>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Service for the default config file location.
    pub fn for_paths(paths: &PairUpPaths) -> Self {
        Self::new(paths.config_file())
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn load(&self) -> Result<RootConfig> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    pub fn save(&self, config: &RootConfig) -> Result<()> {
        self.file.save(config)?;
        tracing::debug!("Saved config to {}", self.file.path().display());
        Ok(())
    }

    /// Remembers `uid` as the user the CLI acts as by default.
    pub fn set_current_user(&self, uid: &str) -> Result<RootConfig> {
        self.file.update(RootConfig::default(), |config| {
            config.user.current_uid = Some(uid.to_string());
            Ok(config.clone())
        })
    }
}

/// Where the TOML backend keeps its documents.
///
/// `[storage] data_dir` wins over the platform default.
pub fn resolve_data_dir(config: &RootConfig, paths: &PairUpPaths) -> PathBuf {
    config
        .storage
        .data_dir
        .clone()
        .unwrap_or_else(|| paths.data_dir().clone())
}

/// Whether the config asks for a store that outlives the process.
pub fn is_persistent(config: &RootConfig) -> bool {
    config.storage.backend == StorageBackend::Toml
}
