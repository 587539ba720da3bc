//! # tessera-ref-training
//!
//! Reference training-session runtime for the TESSERA audit chain.
//!
//! Demonstrates two instructor-station scenarios using mock data:
//!
//! 1. **Authorization Flow**: a weapons-release request and its approval are
//!    chained, verified, then a copy of the export is edited to show exactly
//!    where tampering is detected.
//! 2. **Safe-Mode Drill**: a full drill (instructor command, safe mode,
//!    weapons state, link loss, session end) is exported and re-checked
//!    offline through the custody checker.
//!
//! All callsigns, entities and requests are fictional.

pub mod mock_data;
pub mod scenarios;

/// Store configuration shared by every scenario.
pub(crate) const TRAINING_STORE_CONFIG: &str = include_str!("../config/training_store.toml");
