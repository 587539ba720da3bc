//! Custody checker for exported audit logs.
//!
//! `CustodyChecker` runs the structural phase with the `jsonschema` crate and
//! accumulates every violation, so an operator sees the full failure set in
//! one pass.  The chain phase runs only on a structurally valid document and
//! reuses the same verifier the live store uses.

use std::path::Path;

use jsonschema::Validator;
use serde::Serialize;
use tracing::{debug, info, warn};

use tessera_audit::{summarize, verify_chain};
use tessera_contracts::{
    error::{TesseraError, TesseraResult},
    entry::HashChainEntry,
    export::{ChainSummary, ExportDocument},
    payload::AuditEntry,
    verify::VerificationResult,
};
use tessera_core::{digest::Sha256Digest, traits::ChainDigest};

use crate::schema::export_document_schema;

/// One structural problem in an export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFailure {
    /// JSON Pointer to the offending value; empty for the document root.
    pub path: String,
    pub message: String,
}

/// Outcome of a custody check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustodyReport {
    /// Structural violations.  When non-empty the chain phase did not run.
    pub schema_failures: Vec<SchemaFailure>,

    /// Whether the declared `chainLength` equals the number of entries.
    pub length_matches: bool,

    /// Chain verification result.  `None` when the structural phase failed.
    pub verification: Option<VerificationResult>,

    /// Head/tail summary of the decoded chain.
    pub summary: Option<ChainSummary>,
}

impl CustodyReport {
    fn rejected(schema_failures: Vec<SchemaFailure>) -> Self {
        Self {
            schema_failures,
            length_matches: false,
            verification: None,
            summary: None,
        }
    }

    /// True only if the document is well-formed, complete, and its chain
    /// verifies.
    pub fn is_trustworthy(&self) -> bool {
        self.schema_failures.is_empty()
            && self.length_matches
            && self.verification.as_ref().is_some_and(|v| v.valid)
    }
}

/// Validates exported audit logs offline.
pub struct CustodyChecker {
    validator: Validator,
    digest: Box<dyn ChainDigest>,
}

impl CustodyChecker {
    /// A checker that verifies chains with SHA-256.
    pub fn new() -> TesseraResult<Self> {
        Self::with_digest(Box::new(Sha256Digest))
    }

    /// A checker that verifies chains with `digest`.
    ///
    /// Returns `ConfigError` if the embedded export schema fails to compile.
    pub fn with_digest(digest: Box<dyn ChainDigest>) -> TesseraResult<Self> {
        let validator = jsonschema::validator_for(&export_document_schema()).map_err(|e| {
            TesseraError::ConfigError {
                reason: format!("invalid export document schema: {e}"),
            }
        })?;
        Ok(Self { validator, digest })
    }

    /// Read and check the export file at `path`.
    pub fn check_file(&self, path: &Path) -> TesseraResult<CustodyReport> {
        let contents = std::fs::read_to_string(path).map_err(|e| TesseraError::Import {
            reason: format!("failed to read audit export '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "audit export loaded");
        self.check_str(&contents)
    }

    /// Check an export document given as JSON text.
    ///
    /// Only text that is not JSON at all is an error (`Import`).  Everything
    /// wrong with a parseable document is reported in the `CustodyReport`.
    pub fn check_str(&self, json: &str) -> TesseraResult<CustodyReport> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| TesseraError::Import {
            reason: format!("audit export is not valid JSON: {e}"),
        })?;
        Ok(self.check_value(value))
    }

    /// Check an already-parsed export document.
    pub fn check_value(&self, value: serde_json::Value) -> CustodyReport {
        // ── Phase 1: JSON Schema structural validation ────────────────────────
        let mut failures: Vec<SchemaFailure> = self
            .validator
            .iter_errors(&value)
            .map(|error| SchemaFailure {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        for failure in &failures {
            warn!(path = %failure.path, message = %failure.message, "export schema violation");
        }
        if !failures.is_empty() {
            return CustodyReport::rejected(failures);
        }

        let raw_entries = value.get("entries").cloned().unwrap_or_default();

        // The schema leaves per-variant fields to the payload decoder.
        let document: ExportDocument<AuditEntry> = match serde_json::from_value(value) {
            Ok(document) => document,
            Err(e) => {
                let failure = SchemaFailure {
                    path: String::new(),
                    message: format!("entry payload does not decode: {e}"),
                };
                warn!(message = %failure.message, "export schema violation");
                failures.push(failure);
                return CustodyReport::rejected(failures);
            }
        };

        // Hashes are recomputed over the decoded entries, so each one must
        // re-encode to exactly what the file holds.
        failures.extend(non_canonical_entries(&raw_entries, &document.entries));
        if !failures.is_empty() {
            return CustodyReport::rejected(failures);
        }

        // ── Phase 2: chain verification ──────────────────────────────────────
        let verification = verify_chain(self.digest.as_ref(), &document.entries);
        let length_matches = document.chain_length == document.entries.len();
        if !length_matches {
            warn!(
                declared = document.chain_length,
                actual = document.entries.len(),
                "export chain length does not match its entries"
            );
        }

        let report = CustodyReport {
            schema_failures: failures,
            length_matches,
            summary: Some(summarize(&document.entries)),
            verification: Some(verification),
        };

        info!(
            exported_at = %document.exported_at,
            chain_length = document.entries.len(),
            trustworthy = report.is_trustworthy(),
            "custody check complete"
        );
        report
    }
}

/// Entries whose decoded form does not re-encode to the exported JSON.
fn non_canonical_entries(
    raw_entries: &serde_json::Value,
    entries: &[HashChainEntry<AuditEntry>],
) -> Vec<SchemaFailure> {
    let raw = raw_entries.as_array().map(Vec::as_slice).unwrap_or(&[]);

    entries
        .iter()
        .zip(raw)
        .enumerate()
        .filter_map(|(position, (entry, raw))| match serde_json::to_value(entry) {
            Ok(encoded) if encoded == *raw => None,
            _ => {
                let failure = SchemaFailure {
                    path: format!("/entries/{position}"),
                    message: "entry does not re-encode to its exported form".to_string(),
                };
                warn!(path = %failure.path, "export entry is not canonical");
                Some(failure)
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use tessera_audit::{export_chain, to_json_pretty, ChainBuilder};
    use tessera_contracts::{
        error::TesseraError,
        export::ExportDocument,
        payload::{AuditEntry, AuthDecision, LinkStatus},
        time::Timestamp,
        verify::ChainFault,
    };
    use tessera_core::{clock::SteppedClock, digest::Sha256Digest};

    use super::{non_canonical_entries, CustodyChecker};

    // ── Builder helpers ───────────────────────────────────────────────────────

    fn start() -> Timestamp {
        Timestamp::from_millis(1_704_067_200_000).unwrap()
    }

    /// A pretty-printed, valid four-entry export.
    fn exported_session() -> String {
        let builder = ChainBuilder::new(
            Box::new(Sha256Digest),
            Box::new(SteppedClock::new(start(), 250)),
        );
        let mut chain = builder.create_chain(AuditEntry::session_start(start())).unwrap();
        for payload in [
            AuditEntry::auth_request(start(), "r1").with_entity("raven-2"),
            AuditEntry::auth_decision(start(), "r1", AuthDecision::Approved),
            AuditEntry::link_status_change(start(), LinkStatus::Degraded)
                .with_detail("snr_db", 4.5),
        ] {
            let entry = builder.append(&chain, payload).unwrap();
            chain.push(entry);
        }
        to_json_pretty(&export_chain(&chain, builder.clock())).unwrap()
    }

    fn exported_value() -> Value {
        serde_json::from_str(&exported_session()).unwrap()
    }

    // ── Trustworthy documents ─────────────────────────────────────────────────

    #[test]
    fn test_clean_export_is_trustworthy() {
        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_str(&exported_session()).unwrap();

        assert!(report.is_trustworthy(), "unexpected report: {:?}", report);
        assert!(report.schema_failures.is_empty());
        assert!(report.length_matches);

        let summary = report.summary.unwrap();
        assert_eq!(summary.length, 4);
        assert_eq!(summary.first_timestamp, Some(start()));
    }

    #[test]
    fn test_check_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "tessera-custody-{}.json",
            tessera_contracts::entry::SessionId::new()
        ));
        std::fs::write(&path, exported_session()).unwrap();

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(report.is_trustworthy());
    }

    // ── Chain phase ───────────────────────────────────────────────────────────

    /// A well-formed but edited document passes the schema and fails the chain.
    #[test]
    fn test_tampered_request_id_is_caught() {
        let mut value = exported_value();
        value["entries"][1]["data"]["requestId"] = json!("r2");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(report.schema_failures.is_empty());
        assert!(!report.is_trustworthy());
        let verification = report.verification.unwrap();
        assert_eq!(verification.broken_at_index, Some(1));
        assert_eq!(verification.reason, Some(ChainFault::HashMismatch));
    }

    /// Dropping the tail entry keeps the chain valid but breaks chainLength.
    #[test]
    fn test_truncation_detected_by_length() {
        let mut value = exported_value();
        value["entries"].as_array_mut().unwrap().pop();

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(report.verification.as_ref().unwrap().valid);
        assert!(!report.length_matches);
        assert!(!report.is_trustworthy());
    }

    // ── Structural phase ──────────────────────────────────────────────────────

    /// Every structural problem is reported, not just the first.
    #[test]
    fn test_schema_failures_are_collected() {
        let mut value = exported_value();
        value["version"] = json!("2.0.0");
        value["chainLength"] = json!("four");
        value["entries"][2].as_object_mut().unwrap().remove("hash");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(report.schema_failures.len() >= 3, "failures: {:?}", report.schema_failures);
        assert!(report.verification.is_none());
        assert!(!report.is_trustworthy());

        let paths: Vec<&str> = report.schema_failures.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"/version"));
        assert!(paths.contains(&"/chainLength"));
        assert!(paths.contains(&"/entries/2"));
    }

    #[test]
    fn test_unknown_entry_type_rejected() {
        let mut value = exported_value();
        value["entries"][3]["data"]["entryType"] = json!("SELF_DESTRUCT");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert_eq!(report.schema_failures.len(), 1);
        assert_eq!(report.schema_failures[0].path, "/entries/3/data/entryType");
    }

    #[test]
    fn test_non_hex_hash_rejected() {
        let mut value = exported_value();
        value["entries"][0]["hash"] = json!("NOT-A-DIGEST");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(!report.schema_failures.is_empty());
        assert_eq!(report.schema_failures[0].path, "/entries/0/hash");
    }

    /// A variant missing its own required field passes the schema but fails
    /// payload decoding, which is reported as a structural failure.
    #[test]
    fn test_undecodable_payload_is_a_structural_failure() {
        let mut value = exported_value();
        value["entries"][1]["data"]
            .as_object_mut()
            .unwrap()
            .remove("requestId");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert_eq!(report.schema_failures.len(), 1);
        assert!(report.schema_failures[0].message.contains("requestId"));
        assert!(report.verification.is_none());
    }

    // ── Raw-document edits the typed model cannot hold ────────────────────────

    /// Fields injected into a payload would be dropped on decode and never
    /// reach the hash, so they must reject the document.
    #[test]
    fn test_injected_payload_fields_rejected() {
        let mut value = exported_value();
        value["entries"][1]["data"]["decision"] = json!("APPROVED");
        value["entries"][0]["data"]["entityId"] = json!("viper-9");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(!report.is_trustworthy(), "forged export accepted: {:?}", report);
        assert!(!report.schema_failures.is_empty());
        assert!(report.verification.is_none());
    }

    /// Every alternative spelling of an instant is rejected, wherever it sits.
    #[test]
    fn test_non_canonical_timestamps_rejected() {
        let checker = CustodyChecker::new().unwrap();
        let spellings = [
            "2024-01-01T00:00:00.000999Z",
            "2024-01-01T02:00:00.000+02:00",
            "2024-01-01T00:00:00Z",
            "2024-01-01T00:00:00.000z",
        ];

        for spelling in spellings {
            let mut value = exported_value();
            value["entries"][0]["timestamp"] = json!(spelling);
            let report = checker.check_value(value);
            assert!(!report.is_trustworthy(), "{spelling} accepted on entry");
            assert_eq!(report.schema_failures[0].path, "/entries/0/timestamp");

            let mut value = exported_value();
            value["entries"][2]["data"]["timestamp"] = json!(spelling);
            let report = checker.check_value(value);
            assert!(!report.is_trustworthy(), "{spelling} accepted on payload");
            assert_eq!(report.schema_failures[0].path, "/entries/2/data/timestamp");
        }
    }

    #[test]
    fn test_removed_details_rejected() {
        let mut value = exported_value();
        value["entries"][1]["data"].as_object_mut().unwrap().remove("details");

        let checker = CustodyChecker::new().unwrap();
        let report = checker.check_value(value);

        assert!(!report.is_trustworthy());
        assert_eq!(report.schema_failures[0].path, "/entries/1/data");
    }

    #[test]
    fn test_extra_envelope_field_rejected() {
        let mut value = exported_value();
        value["signedBy"] = json!("range-control");

        let checker = CustodyChecker::new().unwrap();
        assert!(!checker.check_value(value).is_trustworthy());
    }

    /// Entries that decode but differ from the raw JSON are flagged by position.
    #[test]
    fn test_non_canonical_entries_reported_by_position() {
        let original = exported_value();
        let document: ExportDocument<AuditEntry> = serde_json::from_value(original.clone()).unwrap();
        assert!(non_canonical_entries(&original["entries"], &document.entries).is_empty());

        let mut edited = original;
        edited["entries"][3]["data"]["details"]["snr_db"] = json!(9.5);

        let failures = non_canonical_entries(&edited["entries"], &document.entries);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, "/entries/3");
    }

    #[test]
    fn test_malformed_json_is_an_import_error() {
        let checker = CustodyChecker::new().unwrap();
        let err = checker.check_str("{\"exportedAt\": ").unwrap_err();
        assert!(matches!(err, TesseraError::Import { .. }));
    }

    #[test]
    fn test_missing_file_is_an_import_error() {
        let checker = CustodyChecker::new().unwrap();
        let err = checker
            .check_file(std::path::Path::new("/nonexistent/tessera/audit.json"))
            .unwrap_err();
        assert!(matches!(err, TesseraError::Import { .. }));
    }
}
