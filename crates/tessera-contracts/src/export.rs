//! Portable export document and status summary types.

use serde::{Deserialize, Serialize};

use crate::{entry::HashChainEntry, time::Timestamp};

/// Format version written into every export document.
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// A snapshot of a whole chain, serialized for offline custody.
///
/// ```json
/// { "exportedAt": "...", "version": "1.0.0", "chainLength": 3, "entries": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<T> {
    /// When the snapshot was taken.
    pub exported_at: Timestamp,

    /// Export format version, `EXPORT_FORMAT_VERSION` for this crate.
    pub version: String,

    /// Number of entries at export time.
    pub chain_length: usize,

    /// Every entry, genesis first.
    pub entries: Vec<HashChainEntry<T>>,
}

/// Lightweight chain status for display.
///
/// Built from the head and tail entries only.  On an empty chain `length` is
/// 0 and every other field is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub length: usize,
    pub first_timestamp: Option<Timestamp>,
    pub last_timestamp: Option<Timestamp>,
    pub last_hash: Option<String>,
}
