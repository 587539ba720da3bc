//! # tessera-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit trail for tactical
//! training sessions.
//!
//! ## Overview
//!
//! Every operator or AI decision is wrapped in a `HashChainEntry` that links
//! to the previous entry via its hash.  Tampering with any entry, even by a
//! single byte, breaks the chain and is detected by `verify_chain`, which
//! reports the earliest broken index.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tessera_audit::{AuditStore, StoreConfig};
//! use tessera_contracts::{entry::SessionId, payload::AuditEntry, time::Timestamp};
//!
//! let store = AuditStore::init(
//!     SessionId::new(),
//!     AuditEntry::session_start(Timestamp::now()),
//!     StoreConfig::default(),
//! )?;
//! store.append(AuditEntry::auth_request(Timestamp::now(), "r1"))?;
//!
//! assert!(store.verify_integrity()?.valid);
//! let json = store.export_audit_log()?;
//! ```

pub mod builder;
pub mod chain;
pub mod config;
pub mod export;
pub mod memory;

pub use builder::ChainBuilder;
pub use chain::{genesis_hash, link_hash, verify_chain, verify_suffix};
pub use config::StoreConfig;
pub use export::{export_chain, from_json, summarize, to_json_pretty};
pub use memory::AuditStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
