//! Capability traits the chain builder and verifier depend on.
//!
//! - `ChainDigest`: one-way content digest over serialized bytes
//! - `Clock`: source of append timestamps
//!
//! Both are injected so tests can substitute deterministic stubs while
//! production uses `Sha256Digest` and `SystemClock`.

use tessera_contracts::time::Timestamp;

/// A deterministic, one-way digest over raw bytes.
///
/// Implementations must return identical output for identical input on every
/// run and every platform, encoded as fixed-length lowercase hex.  Production
/// implementations must use a cryptographic hash with at least 256 bits of
/// output.
pub trait ChainDigest: Send + Sync {
    /// Digest `input` and return lowercase hex.
    fn digest(&self, input: &[u8]) -> String;

    /// Short algorithm name for logs and diagnostics (e.g. `"sha256"`).
    fn algorithm(&self) -> &'static str;
}

/// The source of append timestamps.
///
/// Values need not be monotonic; verification never depends on timestamp
/// ordering.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
