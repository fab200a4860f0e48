//! Atomic TOML file operations.
//!
//! Provides a thin layer for safe concurrent access to TOML documents.

use pairup_core::PairUpError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// File locking error.
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicTomlError> for PairUpError {
    fn from(err: AtomicTomlError) -> Self {
        match err {
            AtomicTomlError::Io(e) => e.into(),
            AtomicTomlError::Parse(e) => e.into(),
            AtomicTomlError::Serialize(e) => e.into(),
            AtomicTomlError::Lock(message) => PairUpError::data_access(message),
        }
    }
}

/// A handle to a TOML document on disk.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: An exclusive lock on a sibling `.lock` file serializes
///   read-modify-write cycles across threads and processes
/// - **Durability**: Explicit fsync before rename
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a new atomic TOML file handle.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the TOML file and deserializes it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content)?;
        Ok(Some(data))
    }

    /// Saves data to the TOML file atomically.
    ///
    /// Uses a temporary file + atomic rename to ensure durability.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Performs a transactional read-modify-write under the file lock.
    ///
    /// The closure sees the current document (`None` if the file is absent)
    /// and may replace it. When it returns `Ok`, a present document is
    /// written back; when it returns `Err`, nothing is written.
    pub fn transact<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Option<T>) -> Result<R, E>,
        E: From<AtomicTomlError>,
    {
        self.transact_if(|data| f(data).map(|output| (output, true)))
    }

    /// Like [`transact`](Self::transact), but the closure also says whether
    /// to write: `(output, false)` leaves the file untouched.
    pub fn transact_if<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Option<T>) -> Result<(R, bool), E>,
        E: From<AtomicTomlError>,
    {
        let _lock = self.acquire_lock()?;

        let mut data = self.load()?;
        let (output, write) = f(&mut data)?;

        if let (true, Some(data)) = (write, &data) {
            self.save(data)?;
        }

        Ok(output)
    }

    /// Like [`transact`](Self::transact), starting from `default_value`
    /// when the file does not exist yet.
    pub fn update<R, E, F>(&self, default_value: T, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<AtomicTomlError>,
    {
        self.transact(|slot| {
            let data = slot.get_or_insert(default_value);
            f(data)
        })
    }

    /// Gets a temporary file path for atomic writes.
    fn temp_path(&self) -> Result<PathBuf, AtomicTomlError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicTomlError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }

    fn acquire_lock(&self) -> Result<FileLock, AtomicTomlError> {
        FileLock::acquire(&self.path)
    }
}

/// A file lock guard; the lock is released when the handle is dropped.
///
/// The lock file itself is left in place. Deleting it on release would let
/// a waiter that already opened the old inode run concurrently with a new
/// caller that creates a fresh one.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        use fs2::FileExt;
        file.lock_exclusive()
            .map_err(|e| AtomicTomlError::Lock(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    fn counter(count: u32) -> Counter {
        Counter {
            name: "c".to_string(),
            count,
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("c.toml"));

        file.save(&counter(42)).unwrap();
        assert_eq!(file.load().unwrap(), Some(counter(42)));

        // No temp file left behind
        assert!(!temp_dir.path().join(".c.toml.tmp").exists());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("missing.toml"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_transact_error_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("c.toml"));
        file.save(&counter(1)).unwrap();

        let result: Result<(), PairUpError> = file.transact(|data| {
            if let Some(c) = data.as_mut() {
                c.count = 99;
            }
            Err(PairUpError::validation("rejected"))
        });

        assert!(result.is_err());
        assert_eq!(file.load().unwrap(), Some(counter(1)));
    }

    #[test]
    fn test_transact_if_can_skip_the_write() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("c.toml"));
        file.save(&counter(1)).unwrap();

        let skipped: Result<u32, AtomicTomlError> = file.transact_if(|data| {
            let c = data.as_mut().unwrap();
            c.count = 5;
            Ok((c.count, false))
        });
        assert_eq!(skipped.unwrap(), 5);
        assert_eq!(file.load().unwrap(), Some(counter(1)));

        let written: Result<(), AtomicTomlError> = file.transact_if(|data| {
            data.as_mut().unwrap().count = 7;
            Ok(((), true))
        });
        written.unwrap();
        assert_eq!(file.load().unwrap(), Some(counter(7)));
    }

    #[test]
    fn test_transact_leaving_none_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("c.toml");
        let file = AtomicTomlFile::<Counter>::new(path.clone());

        let seen: Result<bool, AtomicTomlError> = file.transact(|data| Ok(data.is_some()));
        assert!(!seen.unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_update_from_default() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Counter>::new(temp_dir.path().join("c.toml"));

        let after: Result<u32, AtomicTomlError> = file.update(counter(0), |c| {
            c.count += 10;
            Ok(c.count)
        });
        assert_eq!(after.unwrap(), 10);

        let after: Result<u32, AtomicTomlError> = file.update(counter(0), |c| {
            c.count += 5;
            Ok(c.count)
        });
        assert_eq!(after.unwrap(), 15);
    }

    #[test]
    fn test_concurrent_updates_do_not_lose_writes() {
        let temp_dir = TempDir::new().unwrap();
        let file = Arc::new(AtomicTomlFile::<Counter>::new(
            temp_dir.path().join("c.toml"),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let file = Arc::clone(&file);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        let r: Result<(), AtomicTomlError> = file.update(counter(0), |c| {
                            c.count += 1;
                            Ok(())
                        });
                        r.unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(file.load().unwrap().unwrap().count, 40);
    }
}
