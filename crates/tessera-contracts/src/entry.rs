//! The hash-chain entry model.
//!
//! `HashChainEntry<T>` is one link of an audit session's chain.  It wraps an
//! opaque payload with its position, the time it was appended, and the two
//! hashes that make tampering detectable.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// The `previous_hash` carried by the genesis entry (index 0).
pub const GENESIS_PREVIOUS_HASH: &str = "GENESIS";

/// Prefix prepended to the genesis hash preimage.
///
/// Distinguishes the genesis hash from the hash an interior entry at index 0
/// would have, so the two forms can never be confused.
pub const GENESIS_HASH_PREFIX: &str = "GENESIS:";

/// Unique identifier for one audit session.
///
/// A session owns exactly one chain; chains are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    /// Create a new, unique session ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single entry in an audit session's hash chain.
///
/// Each entry commits to its predecessor via `previous_hash`.  Changing any
/// field, including anything inside `data`, invalidates `hash` and therefore
/// every later link, which the chain verifier detects.
///
/// Field names serialize in camelCase (`previousHash`) to stay compatible with
/// chains exported by other implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashChainEntry<T> {
    /// Position in the chain, starting at 0 and increasing by exactly 1.
    pub index: u64,

    /// Wall-clock time the entry was appended.  Not guaranteed monotonic.
    pub timestamp: Timestamp,

    /// `hash` of the preceding entry, or `GENESIS_PREVIOUS_HASH` at index 0.
    pub previous_hash: String,

    /// Lowercase hex digest of this entry's own content.
    pub hash: String,

    /// The audit payload.
    pub data: T,
}

impl<T> HashChainEntry<T> {
    /// True when this entry claims to be the genesis entry.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

/// A chain is simply the ordered entries of one session.
pub type Chain<T> = Vec<HashChainEntry<T>>;
