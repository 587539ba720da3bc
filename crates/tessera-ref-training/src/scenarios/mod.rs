//! Training-session demo scenarios.
//!
//! Each scenario opens its own `AuditStore`, drives it with mock events from
//! `mock_data`, and prints what an instructor would see at the station.

pub mod authorization_flow;
pub mod safe_mode_drill;
