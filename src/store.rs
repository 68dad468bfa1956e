use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, trace, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{self, entry_path, key_from_path, temp_path, validate_key, TEMP_SUFFIX};
use crate::lock::WriteLock;
use crate::{KvError, Options, Result};

/// A key-value store keeping each entry in its own `<key>.json` file.
///
/// The directory is the only state: there is no index and no cache, so
/// every read goes to disk and every listing scans the directory.
/// Mutations hold an exclusive advisory lock on the directory for their
/// duration. Reads take no lock; an entry file is always replaced by
/// rename, so a reader sees either the old or the new value.
///
/// `V` is the value type; it defaults to [`serde_json::Value`], which
/// accepts any JSON document.
pub struct Store<V = serde_json::Value> {
    /// Root directory (immutable).
    path: Arc<PathBuf>,
    sync_writes: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Store {
            path: self.path.clone(),
            sync_writes: self.sync_writes,
            _value: PhantomData,
        }
    }
}

impl<V> fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

impl<V> Store<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Opens a `Store` with the given options.
    ///
    /// Creates the root directory (and any missing parents) if it does
    /// not exist. Opening an existing directory is not an error.
    pub fn open(options: Options) -> Result<Self> {
        fs::create_dir_all(&options.path)?;
        info!("Opened store at {}", options.path.display());

        Ok(Self {
            path: Arc::new(options.path),
            sync_writes: options.sync_writes,
            _value: PhantomData,
        })
    }

    /// Opens a `Store` rooted at `path` with default options.
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Options::with_path(path))
    }

    /// Returns the root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `value` under `key`, replacing any previous value, and
    /// returns `value` back to the caller.
    pub fn set(&self, key: &str, value: V) -> Result<V> {
        validate_key(key)?;
        let bytes = codec::encode(&value)?;

        let _lock = WriteLock::acquire(&self.path)?;
        let tmp = temp_path(&self.path, key);
        if let Err(e) = self.write_file(&tmp, &bytes) {
            discard(&tmp);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp, entry_path(&self.path, key)) {
            discard(&tmp);
            return Err(e.into());
        }
        if self.sync_writes {
            sync_dir(&self.path)?;
        }
        debug!("Set {} ({} bytes)", key, bytes.len());

        Ok(value)
    }

    /// Gets the value stored under `key`, or `None` if there is none.
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        validate_key(key)?;
        trace!("Get {}", key);
        read_entry(&entry_path(&self.path, key))
    }

    /// Gets the value stored under `key`.
    ///
    /// Returns [`KvError::KeyNotFound`] if the key does not exist.
    pub fn get_or_fail(&self, key: &str) -> Result<V> {
        self.get(key)?
            .ok_or_else(|| KvError::KeyNotFound(key.to_owned()))
    }

    /// Deletes `key`. Returns `true` if an entry was removed and `false`
    /// if there was nothing to remove.
    ///
    /// A directory named `<key>.json` is not an entry and is left alone.
    pub fn delete(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        let _lock = WriteLock::acquire(&self.path)?;
        let path = entry_path(&self.path, key);
        if path.is_dir() {
            return Ok(false);
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted {}", key);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Alias of [`Store::delete`].
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.delete(key)
    }

    /// Returns whether an entry exists for `key`.
    pub fn has(&self, key: &str) -> Result<bool> {
        validate_key(key)?;
        match fs::metadata(entry_path(&self.path, key)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every entry.
    ///
    /// Only entry files (and interrupted writes) are removed; the root
    /// directory stays in place and is recreated if it has gone missing.
    pub fn clear(&self) -> Result<()> {
        fs::create_dir_all(&*self.path)?;

        let _lock = WriteLock::acquire(&self.path)?;
        let mut removed = 0usize;
        for entry in fs::read_dir(&*self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_temp = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(TEMP_SUFFIX));
            if key_from_path(&path).is_none() && !is_temp {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!("Cleared {} files from {}", removed, self.path.display());

        Ok(())
    }

    /// Returns every key in the store, in directory listing order.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&*self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(key) = key_from_path(&entry.path()) {
                keys.push(key);
            }
        }
        trace!("Listed {} keys", keys.len());
        Ok(keys)
    }

    /// Returns every `(key, value)` pair, in the same order as [`Store::keys`].
    ///
    /// Each value is read from its own file. An entry deleted after the
    /// directory was listed is skipped.
    pub fn entries(&self) -> Result<Vec<(String, V)>> {
        let mut entries = Vec::new();
        for key in self.keys()? {
            if let Some(value) = read_entry(&entry_path(&self.path, &key))? {
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    /// Returns every value, in the same order as [`Store::entries`].
    pub fn values(&self) -> Result<Vec<V>> {
        Ok(self.entries()?.into_iter().map(|(_, value)| value).collect())
    }

    /// Returns the number of entries.
    pub fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Returns every entry as a lookup table.
    pub fn map(&self) -> Result<HashMap<String, V>> {
        Ok(self.entries()?.into_iter().collect())
    }

    /// Calls `visitor(value, key)` for every entry.
    pub fn for_each<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(V, &str),
    {
        for (key, value) in self.map()? {
            visitor(value, &key);
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(bytes)?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Reads and decodes one entry file. A missing file, or a directory in
/// its place, is `None`.
fn read_entry<V: DeserializeOwned>(path: &Path) -> Result<Option<V>> {
    match fs::read(path) {
        Ok(bytes) => codec::decode(&bytes).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(_) if path.is_dir() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Flushes directory metadata so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Removes a half-written temp file after a failed write.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
