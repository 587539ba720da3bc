//! Scenario 1: Authorization Flow
//!
//! A weapons-release request is raised by the flight lead and approved by
//! the instructor.  The three-entry chain (session start, request, decision)
//! verifies cleanly.  The scenario then edits a copy of the export, changing
//! the request id on entry 1 from `r1` to `r2`, and re-verifies it.
//!
//! Key points shown here:
//! - The request and its decision correlate through `requestId`.
//! - Editing one field of one entry is detected at exactly that entry.
//! - The live store is never touched; tampering only happens on the copy.

use tracing::debug;

use tessera_audit::{from_json, to_json_pretty, verify_chain, AuditStore, StoreConfig};
use tessera_contracts::{
    entry::SessionId,
    error::{TesseraError, TesseraResult},
    payload::AuditEntry,
    time::Timestamp,
    verify::VerificationResult,
};
use tessera_core::digest::Sha256Digest;

use crate::{mock_data, TRAINING_STORE_CONFIG};

/// What the scenario observed.
#[derive(Debug, Clone)]
pub struct AuthorizationOutcome {
    pub chain_length: usize,
    /// Entries correlated with the release request.
    pub correlated_entries: usize,
    /// Verification of the live store.
    pub original: VerificationResult,
    /// Verification of the edited export copy.
    pub tampered: VerificationResult,
}

/// Drive the flow and return its outcome without printing.
pub fn run_flow() -> TesseraResult<AuthorizationOutcome> {
    let config = StoreConfig::from_toml_str(TRAINING_STORE_CONFIG)?;
    let store = AuditStore::init(
        SessionId::new(),
        mock_data::session_opening(Timestamp::now()),
        config,
    )?;

    for event in mock_data::weapons_release_events(Timestamp::now()) {
        store.append(event)?;
    }

    let original = store.verify_integrity()?;
    let correlated_entries = store.entries_for_request(mock_data::RELEASE_REQUEST_ID)?.len();

    // ── Tamper with an exported copy ──────────────────────────────────────────

    let exported = store.export_audit_log()?;
    let forged = forge_request_id(&exported, 1, "r2")?;
    let document = from_json::<AuditEntry>(&forged)?;
    let tampered = verify_chain(&Sha256Digest, &document.entries);

    Ok(AuthorizationOutcome {
        chain_length: store.len()?,
        correlated_entries,
        original,
        tampered,
    })
}

/// Rewrite the `requestId` of entry `index` in an export document, leaving
/// its hash untouched.
fn forge_request_id(exported: &str, index: usize, request_id: &str) -> TesseraResult<String> {
    let mut document = from_json::<AuditEntry>(exported)?;

    let entry = document.entries.get_mut(index).ok_or_else(|| TesseraError::Import {
        reason: format!("export has no entry at index {index}"),
    })?;
    if let AuditEntry::AuthRequestReceived { request_id: id, .. } = &mut entry.data {
        debug!(index, from = %id, to = %request_id, "forging request id on export copy");
        *id = request_id.to_string();
    }

    to_json_pretty(&document)
}

fn integrity_line(result: &VerificationResult) -> String {
    match (result.broken_at_index, result.reason) {
        (Some(index), Some(reason)) => format!(
            "{} (broken at index {}: {})",
            result.status_label(),
            index,
            reason
        ),
        _ => format!(
            "{} ({} entr{} checked)",
            result.status_label(),
            result.entries_checked,
            if result.entries_checked == 1 { "y" } else { "ies" }
        ),
    }
}

// ── Scenario runner ───────────────────────────────────────────────────────────

/// Run Scenario 1: Authorization Flow.
pub fn run_scenario() -> TesseraResult<()> {
    println!("=== Scenario 1: Authorization Flow ===");
    println!();
    println!("  Range:    {}", mock_data::RANGE_ID);
    println!("  Request:  {} (weapons release, {})", mock_data::RELEASE_REQUEST_ID, mock_data::LEAD);
    println!("  Decision: APPROVED by {}", mock_data::INSTRUCTOR_STATION);
    println!();

    let outcome = run_flow()?;

    println!("  Chain length:           {}", outcome.chain_length);
    println!("  Entries for request r1: {}", outcome.correlated_entries);
    println!("  Live chain integrity:   {}", integrity_line(&outcome.original));
    println!();
    println!("  Tamper: entry 1 requestId r1 -> r2 on the exported copy");
    println!("  Copy chain integrity:   {}", integrity_line(&outcome.tampered));
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_contracts::verify::ChainFault;

    #[test]
    fn test_flow_detects_forged_request_id() {
        let outcome = run_flow().unwrap();

        assert_eq!(outcome.chain_length, 3);
        assert_eq!(outcome.correlated_entries, 2);
        assert!(outcome.original.valid);
        assert_eq!(outcome.original.entries_checked, 3);

        assert!(!outcome.tampered.valid);
        assert_eq!(outcome.tampered.broken_at_index, Some(1));
        assert_eq!(outcome.tampered.reason, Some(ChainFault::HashMismatch));
    }

    #[test]
    fn test_forge_keeps_hash_and_changes_id() {
        let store = AuditStore::init(
            SessionId::new(),
            mock_data::session_opening(Timestamp::now()),
            StoreConfig::default(),
        )
        .unwrap();
        store
            .append(AuditEntry::auth_request(Timestamp::now(), "r1"))
            .unwrap();
        let exported = store.export_audit_log().unwrap();

        let forged = from_json::<AuditEntry>(&forge_request_id(&exported, 1, "r2").unwrap()).unwrap();
        let original = from_json::<AuditEntry>(&exported).unwrap();

        assert_eq!(forged.entries[1].hash, original.entries[1].hash);
        assert_eq!(forged.entries[1].data.request_id(), Some("r2"));
    }

    #[test]
    fn test_forge_out_of_range_is_an_error() {
        let store = AuditStore::init(
            SessionId::new(),
            mock_data::session_opening(Timestamp::now()),
            StoreConfig::default(),
        )
        .unwrap();
        let exported = store.export_audit_log().unwrap();

        assert!(forge_request_id(&exported, 5, "r2").is_err());
    }

    #[test]
    fn test_integrity_line() {
        assert_eq!(integrity_line(&VerificationResult::intact(1)), "VERIFIED (1 entry checked)");
        assert_eq!(
            integrity_line(&VerificationResult::broken(1, ChainFault::BrokenLink, 1)),
            "COMPROMISED (broken at index 1: previous hash does not match the preceding entry)"
        );
    }
}
