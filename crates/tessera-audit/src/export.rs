//! Export documents and chain summaries.

use serde::{de::DeserializeOwned, Serialize};

use tessera_contracts::{
    entry::HashChainEntry,
    error::{TesseraError, TesseraResult},
    export::{ChainSummary, ExportDocument, EXPORT_FORMAT_VERSION},
};
use tessera_core::traits::Clock;

/// Snapshot `entries` into a portable export document.
///
/// The document owns a copy of every entry; later appends to the live chain
/// do not affect it.
pub fn export_chain<T: Clone>(entries: &[HashChainEntry<T>], clock: &dyn Clock) -> ExportDocument<T> {
    ExportDocument {
        exported_at: clock.now(),
        version: EXPORT_FORMAT_VERSION.to_string(),
        chain_length: entries.len(),
        entries: entries.to_vec(),
    }
}

/// Summarize a chain from its head and tail entries.
pub fn summarize<T>(entries: &[HashChainEntry<T>]) -> ChainSummary {
    ChainSummary {
        length: entries.len(),
        first_timestamp: entries.first().map(|e| e.timestamp),
        last_timestamp: entries.last().map(|e| e.timestamp),
        last_hash: entries.last().map(|e| e.hash.clone()),
    }
}

/// Render an export document as pretty-printed JSON.
pub fn to_json_pretty<T: Serialize>(document: &ExportDocument<T>) -> TesseraResult<String> {
    serde_json::to_string_pretty(document).map_err(|e| TesseraError::Serialization {
        reason: format!("failed to serialize export document: {}", e),
    })
}

/// Parse an export document previously produced by `to_json_pretty`.
///
/// Parsing does not verify the chain; run `verify_chain` on the entries.
pub fn from_json<T: DeserializeOwned>(json: &str) -> TesseraResult<ExportDocument<T>> {
    serde_json::from_str(json).map_err(|e| TesseraError::Import {
        reason: format!("failed to parse export document: {}", e),
    })
}
