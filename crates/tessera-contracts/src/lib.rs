//! # tessera-contracts
//!
//! Shared types, payload schema, and error contracts for the TESSERA
//! tamper-evident audit chain.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions and error types.

pub mod entry;
pub mod error;
pub mod export;
pub mod payload;
pub mod time;
pub mod verify;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use entry::{HashChainEntry, SessionId, GENESIS_PREVIOUS_HASH};
    use error::TesseraError;
    use payload::{AuditEntry, AuditEntryType, AuthDecision, WeaponsState};
    use time::Timestamp;
    use verify::{ChainFault, VerificationResult};

    fn jan_first() -> Timestamp {
        Timestamp::from_millis(1_704_067_200_000).unwrap()
    }

    // ── Timestamp ────────────────────────────────────────────────────────────

    #[test]
    fn timestamp_renders_with_millisecond_precision() {
        assert_eq!(jan_first().to_iso_string(), "2024-01-01T00:00:00.000Z");

        let with_millis = Timestamp::from_millis(1_704_067_200_123).unwrap();
        assert_eq!(with_millis.to_iso_string(), "2024-01-01T00:00:00.123Z");
    }

    #[test]
    fn timestamp_parse_normalizes_offsets_and_precision() {
        let plain = Timestamp::parse("2024-01-01T00:00:00Z").unwrap();
        let offset = Timestamp::parse("2024-01-01T02:00:00+02:00").unwrap();
        let nanos = Timestamp::parse("2024-01-01T00:00:00.000999999Z").unwrap();

        assert_eq!(plain, jan_first());
        assert_eq!(offset, jan_first());
        assert_eq!(nanos, jan_first());
    }

    #[test]
    fn timestamp_serde_uses_iso_string() {
        let json = serde_json::to_string(&jan_first()).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00.000Z\"");

        let decoded: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, jan_first());

        assert!(serde_json::from_str::<Timestamp>("\"yesterday\"").is_err());
    }

    // ── AuditEntry wire format ───────────────────────────────────────────────

    #[test]
    fn audit_entry_serializes_flat_with_entry_type_tag() {
        let entry = AuditEntry::auth_request(jan_first(), "r1");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"entryType":"AUTH_REQUEST_RECEIVED","timestamp":"2024-01-01T00:00:00.000Z","requestId":"r1","details":{}}"#
        );
    }

    #[test]
    fn audit_entry_details_serialize_in_sorted_key_order() {
        let entry = AuditEntry::session_start(jan_first())
            .with_detail("zulu", 1)
            .with_detail("alpha", "first");
        let value = serde_json::to_string(&entry).unwrap();
        let alpha = value.find("alpha").unwrap();
        let zulu = value.find("zulu").unwrap();
        assert!(alpha < zulu, "details keys must be sorted: {value}");
    }

    #[test]
    fn audit_entry_deserializes_with_missing_optional_fields() {
        let decoded: AuditEntry = serde_json::from_value(json!({
            "entryType": "AUTH_DECISION_MADE",
            "timestamp": "2024-01-01T00:00:00Z",
            "requestId": "r1",
            "decision": "APPROVED"
        }))
        .unwrap();

        assert_eq!(decoded.entry_type(), AuditEntryType::AuthDecisionMade);
        assert_eq!(decoded.request_id(), Some("r1"));
        assert_eq!(decoded.entity_id(), None);
        assert!(decoded.details().is_empty());
        assert_eq!(
            decoded,
            AuditEntry::auth_decision(jan_first(), "r1", AuthDecision::Approved)
        );
    }

    #[test]
    fn audit_entry_rejects_unknown_entry_type() {
        let result = serde_json::from_value::<AuditEntry>(json!({
            "entryType": "LAUNCH_EVERYTHING",
            "timestamp": "2024-01-01T00:00:00Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn audit_entry_accessors_cover_every_variant() {
        let ts = jan_first();
        let entries = vec![
            AuditEntry::session_start(ts),
            AuditEntry::session_end(ts),
            AuditEntry::auth_request(ts, "r1"),
            AuditEntry::auth_decision(ts, "r1", AuthDecision::Denied),
            AuditEntry::auth_timeout(ts, "r1"),
            AuditEntry::safe_mode(ts, true),
            AuditEntry::safe_mode(ts, false),
            AuditEntry::instructor_command(ts, "PAUSE"),
            AuditEntry::weapons_state_change(ts, "viper-1", WeaponsState::Hold, WeaponsState::Tight),
            AuditEntry::link_status_change(ts, payload::LinkStatus::Lost),
            AuditEntry::alert(ts, payload::AlertSeverity::Critical),
            AuditEntry::custom(ts, "range-cleared"),
        ];

        let types: Vec<AuditEntryType> = entries.iter().map(|e| e.entry_type()).collect();
        assert_eq!(types, AuditEntryType::ALL.to_vec());

        for entry in &entries {
            assert_eq!(entry.timestamp(), ts);
            // Every variant's wire tag matches AuditEntryType::as_str.
            let value = serde_json::to_value(entry).unwrap();
            assert_eq!(value["entryType"], entry.entry_type().as_str());
        }
    }

    #[test]
    fn with_entity_sets_optional_slot_only() {
        let request = AuditEntry::auth_request(jan_first(), "r1").with_entity("viper-1");
        assert_eq!(request.entity_id(), Some("viper-1"));

        let start = AuditEntry::session_start(jan_first()).with_entity("viper-1");
        assert_eq!(start.entity_id(), None);

        let weapons = AuditEntry::weapons_state_change(
            jan_first(),
            "viper-2",
            WeaponsState::Tight,
            WeaponsState::Free,
        )
        .with_entity("ignored");
        assert_eq!(weapons.entity_id(), Some("viper-2"));
    }

    #[test]
    fn unknown_payload_fields_are_rejected() {
        let forged = json!({
            "entryType": "AUTH_REQUEST_RECEIVED",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "requestId": "r1",
            "decision": "APPROVED",
            "details": {}
        });
        assert!(serde_json::from_value::<AuditEntry>(forged).is_err());

        let forged_start = json!({
            "entryType": "SESSION_START",
            "timestamp": "2024-01-01T00:00:00.000Z",
            "entityId": "viper-9",
            "details": {}
        });
        assert!(serde_json::from_value::<AuditEntry>(forged_start).is_err());
    }

    // ── HashChainEntry ───────────────────────────────────────────────────────

    #[test]
    fn hash_chain_entry_uses_camel_case_fields() {
        let entry = HashChainEntry {
            index: 0,
            timestamp: jan_first(),
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            hash: "ab".repeat(32),
            data: json!({ "k": "v" }),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["previousHash"], "GENESIS");
        assert!(value.get("previous_hash").is_none());
        assert!(entry.is_genesis());
    }

    #[test]
    fn session_id_new_produces_unique_values() {
        let unique: std::collections::HashSet<String> =
            (0..100).map(|_| SessionId::new().to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    // ── VerificationResult ───────────────────────────────────────────────────

    #[test]
    fn verification_result_labels() {
        assert_eq!(VerificationResult::intact(3).status_label(), "VERIFIED");

        let broken = VerificationResult::broken(1, ChainFault::HashMismatch, 1);
        assert_eq!(broken.status_label(), "COMPROMISED");
        assert_eq!(broken.broken_at_index, Some(1));

        let value = serde_json::to_value(&broken).unwrap();
        assert_eq!(value["brokenAtIndex"], 1);
        assert_eq!(value["reason"], "HashMismatch");
    }

    // ── TesseraError display messages ────────────────────────────────────────

    #[test]
    fn error_serialization_display() {
        let err = TesseraError::Serialization {
            reason: "key must be a string".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("serialization failed"));
        assert!(msg.contains("key must be a string"));
    }

    #[test]
    fn error_empty_chain_display() {
        assert!(TesseraError::EmptyChain.to_string().contains("empty chain"));
    }

    #[test]
    fn error_index_overflow_display() {
        let err = TesseraError::IndexOverflow { tail_index: u64::MAX };
        assert!(err.to_string().contains(&u64::MAX.to_string()));
    }

    #[test]
    fn error_concurrent_modification_display() {
        let err = TesseraError::ConcurrentModification {
            expected: "aaa".to_string(),
            actual: "bbb".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("aaa"));
        assert!(msg.contains("bbb"));
    }

    #[test]
    fn error_config_and_import_display() {
        let config = TesseraError::ConfigError {
            reason: "max_append_retries must be positive".to_string(),
        };
        assert!(config.to_string().contains("configuration error"));

        let import = TesseraError::Import {
            reason: "expected value at line 1".to_string(),
        };
        assert!(import.to_string().contains("import failed"));
    }
}
