//! Path management for PairUp configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/pairup/            # Config directory
//! └── pairup.toml              # Application configuration
//!
//! ~/.local/share/pairup/       # Data directory (TOML backend)
//! ├── users/<uid>.toml         # Profile + notifications
//! ├── sessions/<id>.toml       # Session record + both chat logs
//! └── testimonials.toml
//! ```
//!
//! Setting `PAIRUP_HOME` puts both directories under that one path.

use std::path::PathBuf;
use thiserror::Error;

/// Environment variable overriding every PairUp directory.
pub const HOME_ENV: &str = "PAIRUP_HOME";

const APP_DIR: &str = "pairup";
const CONFIG_FILE: &str = "pairup.toml";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Home directory could not be determined.
    #[error("Cannot find home directory")]
    HomeDirNotFound,
}

impl From<PathError> for pairup_core::PairUpError {
    fn from(err: PathError) -> Self {
        pairup_core::PairUpError::config(err.to_string())
    }
}

/// Resolved locations of the config file and data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairUpPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl PairUpPaths {
    /// Resolves paths from an explicit home, falling back to the platform
    /// config and data directories.
    pub fn new(home: Option<PathBuf>) -> Result<Self, PathError> {
        if let Some(home) = home {
            return Ok(Self {
                config_dir: home.clone(),
                data_dir: home,
            });
        }

        let config_dir = dirs::config_dir()
            .ok_or(PathError::HomeDirNotFound)?
            .join(APP_DIR);
        let data_dir = dirs::data_dir()
            .ok_or(PathError::HomeDirNotFound)?
            .join(APP_DIR);

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Resolves paths honouring `PAIRUP_HOME`.
    pub fn from_env() -> Result<Self, PathError> {
        let home = std::env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(home)
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    /// Default data directory, before any `[storage] data_dir` override.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_home_holds_everything() {
        let paths = PairUpPaths::new(Some(PathBuf::from("/tmp/pu"))).unwrap();
        assert_eq!(paths.config_dir(), &PathBuf::from("/tmp/pu"));
        assert_eq!(paths.data_dir(), &PathBuf::from("/tmp/pu"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/pu/pairup.toml"));
    }

    #[test]
    fn test_platform_dirs_end_with_app_name() {
        if let Ok(paths) = PairUpPaths::new(None) {
            assert!(paths.config_dir().ends_with(APP_DIR));
            assert!(paths.data_dir().ends_with(APP_DIR));
        }
    }
}
