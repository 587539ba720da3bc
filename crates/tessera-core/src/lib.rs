//! # tessera-core
//!
//! Capabilities the TESSERA audit chain is built on.
//!
//! This crate provides:
//! - The `ChainDigest` and `Clock` traits
//! - `Sha256Digest`, the production digest
//! - `SystemClock`, `FixedClock` and `SteppedClock`
//! - `canonical_json`, the deterministic serializer for hash preimages
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_core::{digest::Sha256Digest, traits::ChainDigest};
//!
//! let hex = Sha256Digest.digest(b"abc");
//! assert_eq!(hex.len(), 64);
//! ```

pub mod clock;
pub mod digest;
pub mod traits;

pub use clock::{FixedClock, SteppedClock, SystemClock};
pub use digest::{canonical_json, Sha256Digest};
pub use traits::{ChainDigest, Clock};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use tessera_contracts::{error::TesseraError, time::Timestamp};

    use super::*;

    // ── Sha256Digest ──────────────────────────────────────────────────────────

    /// Known-answer vectors from FIPS 180-2.
    #[test]
    fn test_sha256_known_answers() {
        assert_eq!(
            Sha256Digest.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            Sha256Digest.digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_output_is_lowercase_fixed_length() {
        let hex = Sha256Digest.digest(b"GENESIS:{}");
        assert_eq!(hex.len(), digest::SHA256_HEX_LEN);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(Sha256Digest.algorithm(), "sha256");
    }

    // ── canonical_json ────────────────────────────────────────────────────────

    #[test]
    fn test_canonical_json_is_compact_and_repeatable() {
        let value = json!({ "a": { "nested": true }, "b": [1, 2.5, "x"] });
        let first = canonical_json(&value).unwrap();
        let second = canonical_json(&value).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            String::from_utf8(first).unwrap(),
            r#"{"a":{"nested":true},"b":[1,2.5,"x"]}"#
        );
    }

    #[test]
    fn test_canonical_json_rejects_non_string_keys() {
        let mut map = BTreeMap::new();
        map.insert((1, 2), "grid");

        match canonical_json(&map) {
            Err(TesseraError::Serialization { reason }) => {
                assert!(!reason.is_empty());
            }
            other => panic!("expected Serialization error, got {:?}", other),
        }
    }

    // ── Clocks ────────────────────────────────────────────────────────────────

    #[test]
    fn test_fixed_clock_repeats() {
        let t = Timestamp::from_millis(1_704_067_200_000).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn test_stepped_clock_advances() {
        let start = Timestamp::from_millis(1_704_067_200_000).unwrap();
        let clock = SteppedClock::new(start, 250);

        assert_eq!(clock.now(), start);
        assert_eq!(clock.now().timestamp_millis(), 1_704_067_200_250);
        assert_eq!(clock.now().timestamp_millis(), 1_704_067_200_500);
    }

    #[test]
    #[should_panic(expected = "out of the representable range")]
    fn test_stepped_clock_panics_past_range() {
        let start = Timestamp::from_millis(1_704_067_200_000).unwrap();
        let clock = SteppedClock::new(start, i64::MAX / 2);

        clock.now();
        clock.now();
    }

    #[test]
    fn test_system_clock_has_millisecond_resolution() {
        let now = SystemClock.now();
        assert_eq!(now.as_datetime().timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
