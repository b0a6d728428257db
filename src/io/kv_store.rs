use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

/// Error type for key-value store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not encode store: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// A synchronous string-keyed store that survives restarts.
///
/// Values are opaque strings; callers own their encoding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, used for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.shift_remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// The whole key space kept as one JSON object on disk.
///
/// Every `set`/`remove` rewrites the file atomically, so a reader never
/// sees a half-written store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    /// A missing file is an empty store. A file that is not a JSON object of
    /// strings is backed up as `<file>.bak` and the store starts empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let entries = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            match serde_json::from_str::<IndexMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    // Starting empty is only safe once the old file is kept
                    let bak = backup_path(path);
                    fs::copy(path, &bak).map_err(|source| StoreError::WriteError {
                        path: bak.clone(),
                        source,
                    })?;
                    log::warn!(
                        "could not parse {} (backed up as {}): {}",
                        path.display(),
                        bak.display(),
                        e
                    );
                    IndexMap::new()
                }
            }
        } else {
            IndexMap::new()
        };

        Ok(FileStore {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_back(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;
        }
        atomic_write(&self.path, content.as_bytes()).map_err(|e| StoreError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;
        log::debug!("wrote {} keys to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    /// On a failed write the in-memory entry is rolled back, so memory
    /// never holds a value the file does not.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.write_back() {
            match previous {
                Some(old) => {
                    self.entries.insert(key.to_string(), old);
                }
                None => {
                    self.entries.shift_remove(key);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let Some((index, _, old)) = self.entries.shift_remove_full(key) else {
            return Ok(());
        };
        if let Err(e) = self.write_back() {
            self.entries.shift_insert(index, key.to_string(), old);
            return Err(e);
        }
        Ok(())
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
