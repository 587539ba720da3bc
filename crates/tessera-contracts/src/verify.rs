//! Chain verification result types.
//!
//! A compromised chain is a fact to display, not a program fault, so the
//! verifier never returns an error: it returns a `VerificationResult` naming
//! the earliest entry that failed and why.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a chain failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFault {
    /// Entry 0 does not carry the genesis sentinel or is not at index 0.
    InvalidGenesis,
    /// Entry 0's stored hash differs from its recomputed genesis hash.
    GenesisHashMismatch,
    /// An entry's `previous_hash` differs from its predecessor's `hash`.
    BrokenLink,
    /// An entry's stored hash differs from the hash of its visible fields.
    HashMismatch,
    /// An entry's `index` differs from its position in the chain.
    IndexOutOfSequence,
}

impl ChainFault {
    pub fn describe(&self) -> &'static str {
        match self {
            ChainFault::InvalidGenesis => "genesis entry is malformed",
            ChainFault::GenesisHashMismatch => "genesis hash does not match its content",
            ChainFault::BrokenLink => "previous hash does not match the preceding entry",
            ChainFault::HashMismatch => "entry hash does not match its content",
            ChainFault::IndexOutOfSequence => "entry index does not match its position",
        }
    }
}

impl fmt::Display for ChainFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Outcome of verifying a chain (or a suffix of one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// True when every checked entry passed.
    pub valid: bool,

    /// Index of the first entry that failed.  `None` when `valid`.
    #[serde(default)]
    pub broken_at_index: Option<u64>,

    /// What went wrong at `broken_at_index`.  `None` when `valid`.
    #[serde(default)]
    pub reason: Option<ChainFault>,

    /// Number of entries that passed before verification stopped.
    pub entries_checked: usize,
}

impl VerificationResult {
    /// A passing result after checking `entries_checked` entries.
    pub fn intact(entries_checked: usize) -> Self {
        Self {
            valid: true,
            broken_at_index: None,
            reason: None,
            entries_checked,
        }
    }

    /// A failing result at `index`.
    pub fn broken(index: u64, reason: ChainFault, entries_checked: usize) -> Self {
        Self {
            valid: false,
            broken_at_index: Some(index),
            reason: Some(reason),
            entries_checked,
        }
    }

    /// Display label for the dashboard: `VERIFIED` or `COMPROMISED`.
    pub fn status_label(&self) -> &'static str {
        if self.valid {
            "VERIFIED"
        } else {
            "COMPROMISED"
        }
    }
}
