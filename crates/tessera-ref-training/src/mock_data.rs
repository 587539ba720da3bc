//! Simulated training-range data for the TESSERA reference runtime.
//!
//! Everything here is hardcoded and fictional.  This module stands in for
//! the simulator feed and instructor console of a real training range.

use serde_json::json;

use tessera_contracts::{
    payload::{AlertSeverity, AuditEntry, AuthDecision, LinkStatus, WeaponsState},
    time::Timestamp,
};

// ── Range roster ──────────────────────────────────────────────────────────────

/// Training range the sessions run on.
pub const RANGE_ID: &str = "range-north-04";

/// Instructor station issuing commands.
pub const INSTRUCTOR_STATION: &str = "ios-2";

/// Flight lead in both scenarios.
pub const LEAD: &str = "viper-1";

/// Wingman whose datalink drops during the drill.
pub const WINGMAN: &str = "viper-2";

/// The one authorization request the flow scenario raises.
pub const RELEASE_REQUEST_ID: &str = "r1";

// ── Session bookends ──────────────────────────────────────────────────────────

/// Genesis payload for a training session on the reference range.
pub fn session_opening(now: Timestamp) -> AuditEntry {
    AuditEntry::session_start(now)
        .with_detail("range", RANGE_ID)
        .with_detail("instructor", INSTRUCTOR_STATION)
        .with_detail("trainees", json!([LEAD, WINGMAN]))
}

// ── Authorization flow ────────────────────────────────────────────────────────

/// Weapons-release request from the lead, followed by the instructor's
/// approval.
pub fn weapons_release_events(now: Timestamp) -> Vec<AuditEntry> {
    vec![
        AuditEntry::auth_request(now, RELEASE_REQUEST_ID)
            .with_entity(LEAD)
            .with_detail("target", "T-17")
            .with_detail("munition", "inert-practice"),
        AuditEntry::auth_decision(now, RELEASE_REQUEST_ID, AuthDecision::Approved)
            .with_entity(LEAD)
            .with_detail("decidedBy", INSTRUCTOR_STATION)
            .with_detail("latencyMs", 1840),
    ]
}

// ── Safe-mode drill ───────────────────────────────────────────────────────────

/// The drill script, in order, after the session opening.
///
/// The instructor freezes the exercise, safe mode engages, the lead is
/// stepped down to HOLD, the wingman's datalink drops, safe mode clears and
/// the session ends.
pub fn safe_mode_drill_events(now: Timestamp) -> Vec<AuditEntry> {
    vec![
        AuditEntry::instructor_command(now, "FREEZE")
            .with_detail("station", INSTRUCTOR_STATION),
        AuditEntry::safe_mode(now, true).with_detail("trigger", "instructor"),
        AuditEntry::weapons_state_change(now, LEAD, WeaponsState::Free, WeaponsState::Hold)
            .with_detail("cause", "safe-mode"),
        AuditEntry::link_status_change(now, LinkStatus::Lost).with_entity(WINGMAN),
        AuditEntry::alert(now, AlertSeverity::Critical)
            .with_entity(WINGMAN)
            .with_detail("message", "datalink lost"),
        AuditEntry::safe_mode(now, false).with_detail("trigger", "instructor"),
        AuditEntry::session_end(now).with_detail("outcome", "drill-complete"),
    ]
}
