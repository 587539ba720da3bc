//! SHA-256 digest and deterministic serialization.
//!
//! `canonical_json` is the single serialization path for every hash
//! preimage.  `serde_json::to_vec` writes struct fields in declaration order,
//! emits no insignificant whitespace, formats floats with `ryu` (shortest
//! round-trip, platform independent) and encodes strings as UTF-8.  Maps in
//! audit payloads are `BTreeMap`s, so key order is sorted and stable.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::warn;

use tessera_contracts::error::{TesseraError, TesseraResult};

use crate::traits::ChainDigest;

/// Length of a hex-encoded SHA-256 digest.
pub const SHA256_HEX_LEN: usize = 64;

/// Production `ChainDigest` backed by SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ChainDigest for Sha256Digest {
    fn digest(&self, input: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input);
        hex::encode(hasher.finalize())
    }

    fn algorithm(&self) -> &'static str {
        "sha256"
    }
}

/// Serialize `value` to compact, deterministic JSON bytes.
///
/// Returns `TesseraError::Serialization` when the value cannot be represented
/// as JSON (for example a map with non-string keys).
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> TesseraResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        warn!(error = %e, "payload is not serializable");
        TesseraError::Serialization {
            reason: e.to_string(),
        }
    })
}
