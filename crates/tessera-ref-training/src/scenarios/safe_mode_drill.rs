//! Scenario 2: Safe-Mode Drill
//!
//! The instructor freezes the exercise and engages safe mode.  The lead is
//! stepped down to weapons HOLD, the wingman's datalink drops and raises a
//! critical alert, safe mode clears and the session ends.
//!
//! At teardown the store hands back its final export document.  The scenario
//! serializes it as it would be written to disk and runs the offline custody
//! check on that text, so the chain is verified twice: once live, once from
//! the file form.

use tessera_audit::{to_json_pretty, AuditStore, StoreConfig};
use tessera_contracts::{
    entry::SessionId,
    error::TesseraResult,
    export::ChainSummary,
    payload::AuditEntryType,
    time::Timestamp,
    verify::VerificationResult,
};
use tessera_custody::{CustodyChecker, CustodyReport};

use crate::{mock_data, TRAINING_STORE_CONFIG};

/// What the drill observed.
#[derive(Debug, Clone)]
pub struct DrillOutcome {
    pub summary: ChainSummary,
    pub safe_mode_transitions: usize,
    pub wingman_entries: usize,
    pub live: VerificationResult,
    pub custody: CustodyReport,
    /// The export document exactly as it would be written to disk.
    pub exported_json: String,
}

/// Drive the drill and return its outcome without printing.
pub fn run_drill() -> TesseraResult<DrillOutcome> {
    let config = StoreConfig::from_toml_str(TRAINING_STORE_CONFIG)?;
    let store = AuditStore::init(
        SessionId::new(),
        mock_data::session_opening(Timestamp::now()),
        config,
    )?;

    for event in mock_data::safe_mode_drill_events(Timestamp::now()) {
        store.append(event)?;
    }

    let safe_mode_transitions = store.entries_by_type(AuditEntryType::SafeModeActivated)?.len()
        + store.entries_by_type(AuditEntryType::SafeModeDeactivated)?.len();
    let wingman_entries = store.entries_for_entity(mock_data::WINGMAN)?.len();
    let live = store.verify_integrity()?;
    let summary = store.summary()?;

    // ── Offline custody re-check ──────────────────────────────────────────────

    let document = store.teardown()?;
    let exported_json = to_json_pretty(&document)?;
    let custody = CustodyChecker::new()?.check_str(&exported_json)?;

    Ok(DrillOutcome {
        summary,
        safe_mode_transitions,
        wingman_entries,
        live,
        custody,
        exported_json,
    })
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

// ── Scenario runner ───────────────────────────────────────────────────────────

/// Run Scenario 2: Safe-Mode Drill.
pub fn run_scenario() -> TesseraResult<()> {
    println!("=== Scenario 2: Safe-Mode Drill ===");
    println!();
    println!("  Range:      {}", mock_data::RANGE_ID);
    println!("  Instructor: {}", mock_data::INSTRUCTOR_STATION);
    println!(
        "  Script:     FREEZE -> safe mode ON -> {} HOLD -> {} link lost -> safe mode OFF -> end",
        mock_data::LEAD,
        mock_data::WINGMAN
    );
    println!();

    let outcome = run_drill()?;

    println!("  Chain length:           {}", outcome.summary.length);
    println!("  First entry:            {}", optional(outcome.summary.first_timestamp));
    println!("  Last entry:             {}", optional(outcome.summary.last_timestamp));
    println!("  Last hash:              {}", optional(outcome.summary.last_hash.as_deref()));
    println!("  Safe-mode transitions:  {}", outcome.safe_mode_transitions);
    println!("  Entries for {}:     {}", mock_data::WINGMAN, outcome.wingman_entries);
    println!();
    println!(
        "  Live chain integrity:   {} ({} entries checked)",
        outcome.live.status_label(),
        outcome.live.entries_checked
    );
    println!(
        "  Export custody check:   {} ({} bytes, {} schema failure(s))",
        if outcome.custody.is_trustworthy() { "TRUSTWORTHY" } else { "REJECTED" },
        outcome.exported_json.len(),
        outcome.custody.schema_failures.len()
    );
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
