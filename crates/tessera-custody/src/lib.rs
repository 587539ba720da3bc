//! # tessera-custody
//!
//! Offline custody check for exported audit logs.
//!
//! An export file leaves the process that wrote it, so nothing about it can
//! be taken on trust.  [`engine::CustodyChecker`] inspects a document in two
//! phases:
//!
//! 1. **Structural**: the raw JSON is validated against the export document
//!    schema in [`schema`].  Every violation is collected.
//! 2. **Chain**: only a structurally sound document is decoded and its
//!    entries re-verified link by link.  The declared `chainLength` is
//!    compared with the number of entries actually present.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tessera_custody::engine::CustodyChecker;
//!
//! let checker = CustodyChecker::new()?;
//! let report = checker.check_file(Path::new("session-audit.json"))?;
//! if !report.is_trustworthy() {
//!     eprintln!("audit log failed custody check");
//! }
//! ```

pub mod engine;
pub mod schema;

pub use engine::{CustodyChecker, CustodyReport, SchemaFailure};
