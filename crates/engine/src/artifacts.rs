//! Trace artifact layout
//!
//! A trace lives at `<traces_dir>/<trace_id>.pftrace`. Capture writes to
//! `<trace_id>.pftrace.partial` and renames into place on success, so the
//! final path exists only for complete traces.
//!
//! Content digests are memoized per trace, keyed by file length and
//! modification time (plus inode and change time on unix), so running many
//! queries against one trace hashes it once while a re-captured trace is
//! hashed again. A capture publishes by rename, so a new capture always
//! carries a new inode even when the timestamps are too coarse to differ.

use dashmap::DashMap;
use std::fs::{self, File};
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracelab_core::{Error, Result, TraceDigest, TraceId};
use tracing::debug;

const TRACE_EXTENSION: &str = "pftrace";
const PARTIAL_SUFFIX: &str = "partial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
    #[cfg(unix)]
    inode: (u64, u64),
    #[cfg(unix)]
    changed: (i64, i64),
}

impl FileStamp {
    fn of(meta: &fs::Metadata) -> Self {
        #[cfg(unix)]
        use std::os::unix::fs::MetadataExt;

        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
            #[cfg(unix)]
            inode: (meta.dev(), meta.ino()),
            #[cfg(unix)]
            changed: (meta.ctime(), meta.ctime_nsec()),
        }
    }
}

/// Locates trace files and computes their digests
pub struct TraceArtifacts {
    dir: PathBuf,
    digests: DashMap<TraceId, (FileStamp, TraceDigest)>,
}

impl TraceArtifacts {
    /// Artifacts stored under `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            digests: DashMap::new(),
        }
    }

    /// Directory holding the traces
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final location of a trace
    pub fn path(&self, trace_id: &TraceId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", trace_id.as_str(), TRACE_EXTENSION))
    }

    /// Location a capture writes to before the trace is complete
    pub fn partial_path(&self, trace_id: &TraceId) -> PathBuf {
        self.dir.join(format!(
            "{}.{}.{}",
            trace_id.as_str(),
            TRACE_EXTENSION,
            PARTIAL_SUFFIX
        ))
    }

    /// Check if a complete trace is on disk
    pub fn exists(&self, trace_id: &TraceId) -> bool {
        self.path(trace_id).is_file()
    }

    /// Path of an existing trace
    ///
    /// # Errors
    ///
    /// `ArtifactNotFound` if the trace is absent (still capturing, or the
    /// capture failed).
    pub fn require(&self, trace_id: &TraceId) -> Result<PathBuf> {
        let path = self.path(trace_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::ArtifactNotFound {
                trace_id: trace_id.to_string(),
                path: path.display().to_string(),
            })
        }
    }

    /// SHA-256 digest of a trace's bytes
    pub fn digest(&self, trace_id: &TraceId) -> Result<TraceDigest> {
        let path = self.require(trace_id)?;
        let stamp = FileStamp::of(&fs::metadata(&path).map_err(|e| self.io_error(trace_id, &path, e))?);

        if let Some(entry) = self.digests.get(trace_id) {
            let (cached_stamp, digest) = *entry.value();
            if cached_stamp == stamp {
                return Ok(digest);
            }
        }

        let file = File::open(&path).map_err(|e| self.io_error(trace_id, &path, e))?;
        let digest =
            TraceDigest::of_reader(BufReader::new(file)).map_err(|e| self.io_error(trace_id, &path, e))?;
        debug!(trace_id = %trace_id, bytes = stamp.len, digest = %digest, "Trace hashed");
        self.digests.insert(trace_id.clone(), (stamp, digest));
        Ok(digest)
    }

    /// Digest already known for the trace's current contents
    ///
    /// Never reads the trace; returns `None` if it has not been hashed since
    /// it last changed, or if it is absent.
    pub fn memoized_digest(&self, trace_id: &TraceId) -> Option<TraceDigest> {
        let meta = fs::metadata(self.path(trace_id)).ok()?;
        let entry = self.digests.get(trace_id)?;
        let (stamp, digest) = *entry.value();
        (stamp == FileStamp::of(&meta)).then_some(digest)
    }

    fn io_error(&self, trace_id: &TraceId, path: &Path, e: std::io::Error) -> Error {
        if e.kind() == ErrorKind::NotFound {
            Error::ArtifactNotFound {
                trace_id: trace_id.to_string(),
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    }
}
