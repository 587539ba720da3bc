//! Chain builder: genesis creation and entry linking.
//!
//! The builder is stateless apart from its injected capabilities.  `append`
//! returns the new entry instead of pushing it, so the caller that owns the
//! chain decides when (and whether) the entry is committed.

use serde::Serialize;
use tracing::debug;

use tessera_contracts::{
    entry::{Chain, HashChainEntry, GENESIS_PREVIOUS_HASH},
    error::{TesseraError, TesseraResult},
};
use tessera_core::{
    clock::SystemClock,
    digest::Sha256Digest,
    traits::{ChainDigest, Clock},
};

use crate::chain::{genesis_hash, link_hash};

/// Creates genesis entries and links new entries onto a chain tail.
pub struct ChainBuilder {
    digest: Box<dyn ChainDigest>,
    clock: Box<dyn Clock>,
}

impl ChainBuilder {
    pub fn new(digest: Box<dyn ChainDigest>, clock: Box<dyn Clock>) -> Self {
        Self { digest, clock }
    }

    /// A builder using SHA-256 and the system clock.
    pub fn sha256() -> Self {
        Self::new(Box::new(Sha256Digest), Box::new(SystemClock))
    }

    pub fn digest(&self) -> &dyn ChainDigest {
        self.digest.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Start a new chain whose only entry is the genesis entry for `payload`.
    ///
    /// Returns `TesseraError::Serialization` if `payload` cannot be serialized.
    pub fn create_chain<T: Serialize>(&self, payload: T) -> TesseraResult<Chain<T>> {
        let timestamp = self.clock.now();
        let hash = genesis_hash(self.digest(), &timestamp, &payload)?;

        debug!(hash = %hash, algorithm = self.digest.algorithm(), "genesis entry created");

        Ok(vec![HashChainEntry {
            index: 0,
            timestamp,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            hash,
            data: payload,
        }])
    }

    /// Build the entry that follows the tail of `chain`.
    ///
    /// `chain` is not modified; push the returned entry to commit it.
    ///
    /// # Errors
    ///
    /// - `EmptyChain` if `chain` has no genesis entry
    /// - `IndexOverflow` if the tail index is `u64::MAX`
    /// - `Serialization` if `payload` cannot be serialized
    pub fn append<T: Serialize>(
        &self,
        chain: &[HashChainEntry<T>],
        payload: T,
    ) -> TesseraResult<HashChainEntry<T>> {
        let tail = chain.last().ok_or(TesseraError::EmptyChain)?;
        self.link_after(tail.index, &tail.hash, payload)
    }

    /// Build the entry that follows a tail known only by index and hash.
    ///
    /// Used by writers that snapshot the tail and release their lock before
    /// hashing.
    pub fn link_after<T: Serialize>(
        &self,
        tail_index: u64,
        tail_hash: &str,
        payload: T,
    ) -> TesseraResult<HashChainEntry<T>> {
        let index = tail_index
            .checked_add(1)
            .ok_or(TesseraError::IndexOverflow { tail_index })?;
        let timestamp = self.clock.now();
        let hash = link_hash(self.digest(), index, &timestamp, tail_hash, &payload)?;

        debug!(index, hash = %hash, previous_hash = %tail_hash, "chain entry built");

        Ok(HashChainEntry {
            index,
            timestamp,
            previous_hash: tail_hash.to_string(),
            hash,
            data: payload,
        })
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::sha256()
    }
}
