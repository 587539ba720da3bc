//! Hash-chain primitives: link hashing and chain integrity verification.
//!
//! Every field that contributes to an entry's hash is listed explicitly in a
//! preimage struct, so nothing is accidentally omitted and field order is
//! fixed by declaration order.
//!
//! Hash input layout:
//!   genesis:  `"GENESIS:"` ++ canonical JSON of `{timestamp, data}`
//!   interior: canonical JSON of `{index, timestamp, previousHash, data}`
//!
//! Both layouts are part of the interchange format.  Changing field names,
//! field order or the prefix produces hashes that no longer match chains
//! written by other implementations.

use serde::Serialize;
use tracing::warn;

use tessera_contracts::{
    entry::{HashChainEntry, GENESIS_HASH_PREFIX, GENESIS_PREVIOUS_HASH},
    error::TesseraResult,
    time::Timestamp,
    verify::{ChainFault, VerificationResult},
};
use tessera_core::{digest::canonical_json, traits::ChainDigest};

#[derive(Serialize)]
struct GenesisPreimage<'a, T> {
    timestamp: &'a Timestamp,
    data: &'a T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkPreimage<'a, T> {
    index: u64,
    timestamp: &'a Timestamp,
    previous_hash: &'a str,
    data: &'a T,
}

/// Compute the hash of the genesis entry.
///
/// The genesis hash does not cover `index` or `previous_hash`; both are
/// fixed by definition and checked separately by the verifier.
pub fn genesis_hash<T: Serialize>(
    digest: &dyn ChainDigest,
    timestamp: &Timestamp,
    data: &T,
) -> TesseraResult<String> {
    let body = canonical_json(&GenesisPreimage { timestamp, data })?;

    let mut input = Vec::with_capacity(GENESIS_HASH_PREFIX.len() + body.len());
    input.extend_from_slice(GENESIS_HASH_PREFIX.as_bytes());
    input.extend_from_slice(&body);

    Ok(digest.digest(&input))
}

/// Compute the hash of an interior entry (index > 0).
pub fn link_hash<T: Serialize>(
    digest: &dyn ChainDigest,
    index: u64,
    timestamp: &Timestamp,
    previous_hash: &str,
    data: &T,
) -> TesseraResult<String> {
    let body = canonical_json(&LinkPreimage {
        index,
        timestamp,
        previous_hash,
        data,
    })?;
    Ok(digest.digest(&body))
}

/// Verify the integrity of a whole chain.
///
/// Checks, in index order:
///
/// 1. **Genesis**: entry 0 sits at index 0, carries the `GENESIS` sentinel,
///    and its hash matches the recomputed genesis hash.
/// 2. **Sequence**: every later entry's `index` equals its position.
/// 3. **Linkage**: each `previous_hash` equals the preceding entry's `hash`.
/// 4. **Hash correctness**: each `hash` matches the value recomputed from
///    the entry's own fields.
///
/// Stops at the first violation and reports its index, i.e. the earliest
/// point of tampering.  An empty chain is valid.
pub fn verify_chain<T: Serialize>(
    digest: &dyn ChainDigest,
    entries: &[HashChainEntry<T>],
) -> VerificationResult {
    let Some(genesis) = entries.first() else {
        return VerificationResult::intact(0);
    };

    if let Err(fault) = check_genesis(digest, genesis) {
        return finding(0, fault, 0);
    }

    check_range(digest, entries, 1, 1)
}

/// Verify only the entries from `start` onward.
///
/// The hash of `entries[start - 1]` is trusted as the anchor for the first
/// checked link, which lets a caller that already verified a prefix check
/// just the newly appended tail.  `start == 0` is a full verification and
/// `start >= entries.len()` is vacuously valid.
pub fn verify_suffix<T: Serialize>(
    digest: &dyn ChainDigest,
    entries: &[HashChainEntry<T>],
    start: usize,
) -> VerificationResult {
    if start == 0 {
        return verify_chain(digest, entries);
    }
    if start >= entries.len() {
        return VerificationResult::intact(0);
    }

    check_range(digest, entries, start, 0)
}

fn check_range<T: Serialize>(
    digest: &dyn ChainDigest,
    entries: &[HashChainEntry<T>],
    start: usize,
    already_checked: usize,
) -> VerificationResult {
    let mut checked = already_checked;

    for position in start..entries.len() {
        if let Err(fault) = check_link(digest, &entries[position - 1], &entries[position], position) {
            return finding(position as u64, fault, checked);
        }
        checked += 1;
    }

    VerificationResult::intact(checked)
}

fn finding(index: u64, fault: ChainFault, entries_checked: usize) -> VerificationResult {
    warn!(broken_at_index = index, reason = %fault, entries_checked, "chain verification failed");
    VerificationResult::broken(index, fault, entries_checked)
}

fn check_genesis<T: Serialize>(
    digest: &dyn ChainDigest,
    entry: &HashChainEntry<T>,
) -> Result<(), ChainFault> {
    if entry.index != 0 || entry.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(ChainFault::InvalidGenesis);
    }

    match genesis_hash(digest, &entry.timestamp, &entry.data) {
        Ok(recomputed) if recomputed == entry.hash => Ok(()),
        _ => Err(ChainFault::GenesisHashMismatch),
    }
}

fn check_link<T: Serialize>(
    digest: &dyn ChainDigest,
    previous: &HashChainEntry<T>,
    entry: &HashChainEntry<T>,
    position: usize,
) -> Result<(), ChainFault> {
    if entry.index != position as u64 {
        return Err(ChainFault::IndexOutOfSequence);
    }

    if entry.previous_hash != previous.hash {
        return Err(ChainFault::BrokenLink);
    }

    // A payload that no longer serializes cannot reproduce its hash.
    match link_hash(digest, entry.index, &entry.timestamp, &entry.previous_hash, &entry.data) {
        Ok(recomputed) if recomputed == entry.hash => Ok(()),
        _ => Err(ChainFault::HashMismatch),
    }
}
