//! A directory of TOML documents, one file per id.

use super::AtomicTomlFile;
use pairup_core::{PairUpError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const EXTENSION: &str = "toml";

/// Stores documents of type `T` as `<dir>/<id>.toml`.
pub struct TomlDir<T> {
    dir: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TomlDir<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            _phantom: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, id: &str) -> Result<AtomicTomlFile<T>> {
        validate_id(id)?;
        Ok(AtomicTomlFile::new(
            self.dir.join(format!("{}.{}", id, EXTENSION)),
        ))
    }

    pub fn load(&self, id: &str) -> Result<Option<T>> {
        Ok(self.file(id)?.load()?)
    }

    /// Locked read-modify-write of one document.
    ///
    /// See [`AtomicTomlFile::transact`].
    pub fn transact<R, F>(&self, id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Option<T>) -> Result<R>,
    {
        self.file(id)?.transact(f)
    }

    /// See [`AtomicTomlFile::transact_if`].
    pub fn transact_if<R, F>(&self, id: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Option<T>) -> Result<(R, bool)>,
    {
        self.file(id)?.transact_if(f)
    }

    /// Loads every document in the directory.
    ///
    /// A missing directory is an empty store. Files that cannot be read or
    /// parsed are logged and left out.
    pub fn list_all(&self) -> Result<Vec<T>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !is_document(&path) {
                continue;
            }

            match AtomicTomlFile::<T>::new(path.clone()).load() {
                Ok(Some(doc)) => documents.push(doc),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Skipping unreadable document {}: {}", path.display(), e);
                }
            }
        }

        tracing::debug!(
            "Loaded {} documents from {}",
            documents.len(),
            self.dir.display()
        );
        Ok(documents)
    }
}

fn is_document(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_none_or(|name| name.starts_with('.'));
    !hidden && path.extension().is_some_and(|ext| ext == EXTENSION)
}

/// Ids become file names, so only a safe alphabet is allowed.
fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PairUpError::validation(format!("invalid document id: {:?}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_list_skips_lock_and_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlDir::<Note>::new(temp_dir.path().join("notes"));
        assert!(store.list_all().unwrap().is_empty());

        store
            .transact("a", |doc| {
                *doc = Some(note("first"));
                Ok(())
            })
            .unwrap();
        store
            .transact("b", |doc| {
                *doc = Some(note("second"));
                Ok(())
            })
            .unwrap();
        fs::write(store.dir().join(".c.toml.tmp"), "text = \"partial\"").unwrap();

        let mut texts: Vec<String> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        texts.sort();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(store.load("a").unwrap(), Some(note("first")));
    }

    #[test]
    fn test_list_skips_unreadable_documents() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlDir::<Note>::new(temp_dir.path().join("notes"));
        store
            .transact("good", |doc| {
                *doc = Some(note("kept"));
                Ok(())
            })
            .unwrap();
        fs::write(store.dir().join("broken.toml"), "text = 3").unwrap();
        fs::write(store.dir().join("garbage.toml"), "not [valid toml").unwrap();

        let listed = store.list_all().unwrap();
        assert_eq!(listed, vec![note("kept")]);
        // Loading the broken one by id still reports the failure.
        assert!(store.load("broken").unwrap_err().is_backend_failure());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlDir::<Note>::new(temp_dir.path().to_path_buf());

        for id in ["", "../escape", "a/b", "with space"] {
            let err = store.load(id).unwrap_err();
            assert!(err.is_validation_failure(), "{id:?}");
        }
    }
}
