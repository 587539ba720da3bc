//! In-memory audit store for one training session.
//!
//! `AuditStore` is the single owner of a session's chain.  It replaces
//! module-level chain state with an explicit object: create it with `init()`
//! when the session starts and consume it with `teardown()` when it ends.
//!
//! # Concurrency
//!
//! Entries live in a `Vec` behind an `RwLock`.  Appends are optimistic:
//!
//! 1. snapshot the tail (index + hash) under the read lock
//! 2. build and hash the new entry with no lock held
//! 3. take the write lock and commit only if the tail hash is unchanged
//!
//! Two appenders racing on the same tail can therefore never fork the chain;
//! the loser sees `ConcurrentModification` and retries against the new tail
//! (up to `StoreConfig::max_append_retries` times).  Readers always work on
//! a cloned snapshot, so they never observe a half-appended entry.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use tessera_contracts::{
    entry::{HashChainEntry, SessionId},
    error::{TesseraError, TesseraResult},
    export::{ChainSummary, ExportDocument},
    payload::{AuditEntry, AuditEntryType},
    verify::VerificationResult,
};
use tessera_core::clock::SystemClock;

use crate::{
    builder::ChainBuilder,
    chain::verify_chain,
    config::StoreConfig,
    export::{export_chain, summarize, to_json_pretty},
};

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `AuditStore`.
pub(crate) struct ChainState {
    /// All committed entries, genesis first.
    pub(crate) entries: Vec<HashChainEntry<AuditEntry>>,

    /// Outcome of the most recent verification.  Starts `true`; the chain
    /// is only marked compromised once a verification actually fails.
    pub(crate) chain_valid: bool,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// The single-writer, many-reader owner of one session's audit chain.
///
/// Share it between threads as `Arc<AuditStore>`; every method takes `&self`.
pub struct AuditStore {
    session_id: SessionId,
    config: StoreConfig,
    builder: ChainBuilder,
    pub(crate) state: RwLock<ChainState>,
}

impl AuditStore {
    /// Start a session: build the digest from `config`, and create the chain
    /// with `initial` as its genesis payload.
    pub fn init(session_id: SessionId, initial: AuditEntry, config: StoreConfig) -> TesseraResult<Self> {
        let builder = ChainBuilder::new(config.build_digest()?, Box::new(SystemClock));
        Self::with_builder(session_id, initial, config, builder)
    }

    /// Like `init`, but with caller-supplied digest and clock.
    pub fn with_builder(
        session_id: SessionId,
        initial: AuditEntry,
        config: StoreConfig,
        builder: ChainBuilder,
    ) -> TesseraResult<Self> {
        let entries = builder.create_chain(initial)?;

        info!(
            session_id = %session_id,
            genesis_hash = %entries[0].hash,
            algorithm = builder.digest().algorithm(),
            "audit session started"
        );

        Ok(Self {
            session_id,
            config,
            builder,
            state: RwLock::new(ChainState {
                entries,
                chain_valid: true,
            }),
        })
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Append `payload` to the chain.
    ///
    /// Retries transparently when another writer moves the tail between the
    /// snapshot and the commit.  Returns the committed entry.
    pub fn append(&self, payload: AuditEntry) -> TesseraResult<HashChainEntry<AuditEntry>> {
        let mut retries = 0;
        loop {
            let (tail_index, tail_hash) = self.observe_tail()?;
            match self.commit_after(tail_index, &tail_hash, payload.clone()) {
                Err(TesseraError::ConcurrentModification { expected, actual })
                    if retries < self.config.max_append_retries =>
                {
                    retries += 1;
                    warn!(
                        session_id = %self.session_id,
                        expected = %expected,
                        actual = %actual,
                        retries,
                        "chain tail moved during append; retrying"
                    );
                }
                result => return result,
            }
        }
    }

    /// Compare-and-append: commit `payload` only if the chain tail hash is
    /// still `expected_tail_hash`.
    ///
    /// Returns `ConcurrentModification` when the tail has moved; the caller
    /// decides whether to re-read and retry.
    pub fn try_append(
        &self,
        expected_tail_hash: &str,
        payload: AuditEntry,
    ) -> TesseraResult<HashChainEntry<AuditEntry>> {
        let (tail_index, tail_hash) = self.observe_tail()?;
        if tail_hash != expected_tail_hash {
            return Err(TesseraError::ConcurrentModification {
                expected: expected_tail_hash.to_string(),
                actual: tail_hash,
            });
        }
        self.commit_after(tail_index, &tail_hash, payload)
    }

    /// Hash outside the lock, then commit if the tail is still where we saw it.
    fn commit_after(
        &self,
        tail_index: u64,
        tail_hash: &str,
        payload: AuditEntry,
    ) -> TesseraResult<HashChainEntry<AuditEntry>> {
        let entry = self.builder.link_after(tail_index, tail_hash, payload)?;

        let mut state = self.write_state()?;
        let current = state
            .entries
            .last()
            .map(|e| e.hash.as_str())
            .ok_or(TesseraError::EmptyChain)?;

        if current != tail_hash {
            return Err(TesseraError::ConcurrentModification {
                expected: tail_hash.to_string(),
                actual: current.to_string(),
            });
        }

        state.entries.push(entry.clone());

        debug!(
            session_id = %self.session_id,
            index = entry.index,
            entry_type = %entry.data.entry_type(),
            hash = %entry.hash,
            "audit entry appended"
        );

        Ok(entry)
    }

    fn observe_tail(&self) -> TesseraResult<(u64, String)> {
        let state = self.read_state()?;
        state
            .entries
            .last()
            .map(|tail| (tail.index, tail.hash.clone()))
            .ok_or(TesseraError::EmptyChain)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// A consistent copy of every committed entry.
    pub fn entries(&self) -> TesseraResult<Vec<HashChainEntry<AuditEntry>>> {
        Ok(self.read_state()?.entries.clone())
    }

    pub fn len(&self) -> TesseraResult<usize> {
        Ok(self.read_state()?.entries.len())
    }

    pub fn is_empty(&self) -> TesseraResult<bool> {
        Ok(self.read_state()?.entries.is_empty())
    }

    pub fn tail_hash(&self) -> TesseraResult<String> {
        self.observe_tail().map(|(_, hash)| hash)
    }

    /// Result flag of the most recent `verify_integrity` call.
    ///
    /// A poisoned store reports `false`.
    pub fn is_chain_valid(&self) -> bool {
        self.state.read().map(|s| s.chain_valid).unwrap_or(false)
    }

    /// Re-verify every entry and update the validity flag.
    pub fn verify_integrity(&self) -> TesseraResult<VerificationResult> {
        let snapshot = self.entries()?;
        let result = verify_chain(self.builder.digest(), &snapshot);
        self.record_verification(&result)?;
        Ok(result)
    }

    fn record_verification(&self, result: &VerificationResult) -> TesseraResult<()> {
        self.write_state()?.chain_valid = result.valid;

        if result.valid {
            info!(
                session_id = %self.session_id,
                entries_checked = result.entries_checked,
                "audit chain VERIFIED"
            );
        } else {
            warn!(
                session_id = %self.session_id,
                broken_at_index = ?result.broken_at_index,
                reason = ?result.reason,
                "audit chain COMPROMISED"
            );
        }
        Ok(())
    }

    /// Status digest for display: length, first/last timestamp, last hash.
    pub fn summary(&self) -> TesseraResult<ChainSummary> {
        Ok(summarize(&self.read_state()?.entries))
    }

    /// Snapshot the chain into an export document.
    ///
    /// When `verify_on_export` is set, the snapshot is verified first and the
    /// validity flag updated.  A compromised chain is still exported: the
    /// document is evidence either way.
    pub fn export_document(&self) -> TesseraResult<ExportDocument<AuditEntry>> {
        let snapshot = self.entries()?;

        if self.config.verify_on_export {
            let result = verify_chain(self.builder.digest(), &snapshot);
            self.record_verification(&result)?;
        }

        let document = export_chain(&snapshot, self.builder.clock());
        info!(
            session_id = %self.session_id,
            chain_length = document.chain_length,
            exported_at = %document.exported_at,
            "audit log exported"
        );
        Ok(document)
    }

    /// The export document rendered as pretty-printed JSON.
    pub fn export_audit_log(&self) -> TesseraResult<String> {
        to_json_pretty(&self.export_document()?)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn entries_by_type(&self, entry_type: AuditEntryType) -> TesseraResult<Vec<HashChainEntry<AuditEntry>>> {
        self.filter_entries(|data| data.entry_type() == entry_type)
    }

    pub fn entries_for_entity(&self, entity_id: &str) -> TesseraResult<Vec<HashChainEntry<AuditEntry>>> {
        self.filter_entries(|data| data.entity_id() == Some(entity_id))
    }

    /// Every entry correlated with an authorization request, in chain order.
    pub fn entries_for_request(&self, request_id: &str) -> TesseraResult<Vec<HashChainEntry<AuditEntry>>> {
        self.filter_entries(|data| data.request_id() == Some(request_id))
    }

    fn filter_entries<F>(&self, keep: F) -> TesseraResult<Vec<HashChainEntry<AuditEntry>>>
    where
        F: Fn(&AuditEntry) -> bool,
    {
        let state = self.read_state()?;
        Ok(state.entries.iter().filter(|e| keep(&e.data)).cloned().collect())
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// End the session and hand back the final snapshot.
    pub fn teardown(self) -> TesseraResult<ExportDocument<AuditEntry>> {
        let document = self.export_document()?;
        info!(
            session_id = %self.session_id,
            chain_length = document.chain_length,
            terminal_hash = document.entries.last().map(|e| e.hash.as_str()).unwrap_or(""),
            chain_valid = self.is_chain_valid(),
            "audit session closed"
        );
        Ok(document)
    }

    // ── Lock helpers ──────────────────────────────────────────────────────────

    fn read_state(&self) -> TesseraResult<RwLockReadGuard<'_, ChainState>> {
        self.state.read().map_err(|e| TesseraError::StoreUnavailable {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    fn write_state(&self) -> TesseraResult<RwLockWriteGuard<'_, ChainState>> {
        self.state.write().map_err(|e| TesseraError::StoreUnavailable {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }
}
