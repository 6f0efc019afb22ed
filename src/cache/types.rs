use serde::{Deserialize, Serialize};

/// A persisted cache record.
///
/// One record per file. `key` is the hex BLAKE3 digest of `(category, normalized query)`
/// and doubles as the file stem, so a record whose stored key disagrees with its
/// location is treated as corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hex content address.
    pub key: String,
    /// Write time in Unix milliseconds.
    pub timestamp: i64,
    /// Dimension / namespace the entry belongs to.
    pub category: String,
    /// Original (un-normalized) query, kept for inspection.
    pub query: String,
    /// Structured payload.
    pub payload: serde_json::Value,
}

impl CacheEntry {
    /// Returns `true` once `now_ms > timestamp + ttl_ms`.
    #[inline]
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms > self.timestamp.saturating_add(ttl_ms)
    }
}

/// Snapshot of cache occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entry files found (valid + expired + corrupted).
    pub total: usize,
    /// Entries still inside their TTL.
    pub valid: usize,
    /// Entries past their TTL but not yet removed.
    pub expired: usize,
    /// Files that could not be decoded.
    pub corrupted: usize,
    /// Sum of entry file sizes.
    pub size_bytes: u64,
}
