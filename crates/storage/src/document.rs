//! Single-file JSON documents with atomic replacement
//!
//! Each store keeps its whole state in one JSON file. Every access loads the
//! file fully; every mutation rewrites it fully.
//!
//! ## Write Protocol
//!
//! ```text
//! 1. Acquire the document lock (single writer per file)
//! 2. Load current state (missing or corrupt file → default,
//!    any other read error aborts the mutation)
//! 3. Apply the mutation in memory
//! 4. Write <file>.tmp, fsync
//! 5. rename(<file>.tmp, <file>)        ← replacement point
//! 6. fsync parent directory (best effort)
//! 7. Release the lock
//! ```
//!
//! A crash before step 5 leaves the previous file untouched.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracelab_core::{Error, Result};
use tracing::{debug, warn};

/// A JSON document on disk guarded by a per-file lock
///
/// # Thread Safety
///
/// The lock is held across the whole load-mutate-save sequence, so two
/// concurrent mutations cannot lose each other's update.
pub struct JsonDocument<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a handle for the document at `path`
    ///
    /// Nothing is read or created until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: std::marker::PhantomData,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the current state
    ///
    /// # Errors
    ///
    /// `Storage` if the file exists but cannot be read.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let _guard = self.lock.lock();
        let state = self.load()?;
        Ok(f(&state))
    }

    /// Load, mutate and save under the document lock
    ///
    /// `f` returns its result and whether it changed the state; unchanged
    /// state is not rewritten. An unreadable file fails the update before
    /// `f` runs, so it is never replaced.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> (R, bool)) -> Result<R> {
        let _guard = self.lock.lock();
        let mut state = self.load()?;
        let (result, dirty) = f(&mut state);
        if dirty {
            self.save(&state)?;
        }
        Ok(result)
    }

    /// Read the file, treating absence and corruption as empty state
    fn load(&self) -> Result<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt document, using empty state");
                Ok(T::default())
            }
        }
    }

    fn save(&self, state: &T) -> Result<()> {
        let storage_err = |what: &str, e: std::io::Error| {
            Error::Storage(format!("{} {}: {}", what, self.path.display(), e))
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| storage_err("failed to create directory for", e))?;

        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        {
            let mut file = File::create(&tmp).map_err(|e| storage_err("failed to create temp for", e))?;
            file.write_all(&bytes)
                .map_err(|e| storage_err("failed to write temp for", e))?;
            file.sync_all()
                .map_err(|e| storage_err("failed to flush temp for", e))?;
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(storage_err("failed to replace", e));
        }

        if let Ok(dir) = File::open(parent) {
            dir.sync_all().ok();
        }
        debug!(path = %self.path.display(), bytes = bytes.len(), "Document saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
