//! Content fingerprints for the result cache
//!
//! A cache key must identify the exact trace bytes and the exact query
//! text. Derivation is two-stage:
//!
//! ```text
//! trace_digest = SHA-256(trace bytes)
//! fingerprint  = SHA-256(hex(trace_digest) || query text)
//! ```
//!
//! The first stage is independent of the query, so one trace digest can be
//! reused for every query run against the same artifact.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;

const DIGEST_LEN: usize = 32;

fn to_hex(bytes: &[u8; DIGEST_LEN]) -> String {
    hex::encode(bytes)
}

fn from_hex(s: &str) -> Result<[u8; DIGEST_LEN]> {
    let mut out = [0u8; DIGEST_LEN];
    hex::decode_to_slice(s, &mut out)
        .map_err(|e| Error::Validation(format!("malformed digest {}: {}", s, e)))?;
    Ok(out)
}

/// SHA-256 digest of a trace artifact's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceDigest([u8; DIGEST_LEN]);

impl TraceDigest {
    /// Digest an in-memory buffer
    pub fn of_bytes(bytes: &[u8]) -> Self {
        TraceDigest(Sha256::digest(bytes).into())
    }

    /// Digest a stream without buffering it whole
    ///
    /// Traces can be hundreds of megabytes; this reads in fixed chunks.
    pub fn of_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(TraceDigest(hasher.finalize().into()))
    }

    /// Lower-case hex representation
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }
}

impl std::fmt::Display for TraceDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Cache key over (trace content, query text)
///
/// Serialized as a 64-character lower-case hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint([u8; DIGEST_LEN]);

impl Fingerprint {
    /// Derive the fingerprint of a query against a trace
    ///
    /// # Examples
    ///
    /// ```
    /// use tracelab_core::{Fingerprint, TraceDigest};
    ///
    /// let trace = TraceDigest::of_bytes(b"trace bytes");
    /// let a = Fingerprint::derive(&trace, "SELECT 1");
    /// let b = Fingerprint::derive(&trace, "SELECT 2");
    /// assert_ne!(a, b);
    /// ```
    pub fn derive(trace: &TraceDigest, query_text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(trace.to_hex().as_bytes());
        hasher.update(query_text.as_bytes());
        Fingerprint(hasher.finalize().into())
    }

    /// Parse a hex-encoded fingerprint
    pub fn from_hex(s: &str) -> Result<Self> {
        from_hex(s).map(Fingerprint)
    }

    /// Lower-case hex representation
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// First 12 hex characters, for log lines
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Fingerprint::from_hex(&s)
    }
}

impl From<Fingerprint> for String {
    fn from(f: Fingerprint) -> Self {
        f.to_hex()
    }
}
