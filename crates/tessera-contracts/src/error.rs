//! Error types for the TESSERA audit chain.
//!
//! Construction and append failures are returned to the immediate caller as
//! `TesseraError`.  Verification findings are not errors; see
//! `verify::VerificationResult`.

use thiserror::Error;

/// The unified error type for the TESSERA crates.
#[derive(Debug, Error)]
pub enum TesseraError {
    /// A payload could not be deterministically serialized.  The chain is
    /// left unchanged.
    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    /// `append` was called on a chain with no genesis entry.
    #[error("cannot append to an empty chain; create the genesis entry first")]
    EmptyChain,

    /// The chain tail already sits at the largest representable index.
    #[error("cannot append after index {tail_index}: index space exhausted")]
    IndexOverflow { tail_index: u64 },

    /// The chain tail moved between reading it and committing a new entry.
    ///
    /// Recoverable: retry the append against the new tail.
    #[error("chain tail moved during append: expected tail hash {expected}, found {actual}")]
    ConcurrentModification { expected: String, actual: String },

    /// The store's internal lock was poisoned by a panicking writer.
    #[error("audit store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// An exported audit document could not be read or parsed.
    #[error("import failed: {reason}")]
    Import { reason: String },
}

/// Convenience alias used throughout the TESSERA crates.
pub type TesseraResult<T> = Result<T, TesseraError>;
