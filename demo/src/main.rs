//! TESSERA Training Audit: Demo CLI
//!
//! Runs the reference training scenarios, and checks audit exports written
//! by any TESSERA store.
//!
//! Usage:
//!   cargo run -p tessera-demo -- run-all
//!   cargo run -p tessera-demo -- authorization-flow
//!   cargo run -p tessera-demo -- safe-mode-drill
//!   cargo run -p tessera-demo -- verify session-audit.json
//!   cargo run -p tessera-demo -- --config store.toml summarize session-audit.json
//!
//! `verify` exits with status 1 when the file fails its custody check.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tessera_audit::{from_json, summarize, StoreConfig};
use tessera_contracts::{
    error::{TesseraError, TesseraResult},
    payload::{AuditEntry, AuditEntryType},
};
use tessera_custody::{CustodyChecker, CustodyReport};
use tessera_ref_training::scenarios::{authorization_flow, safe_mode_drill};

// ── CLI definition ────────────────────────────────────────────────────────────

/// TESSERA: tamper-evident audit chain for tactical training sessions.
#[derive(Parser)]
#[command(
    name = "tessera",
    about = "TESSERA training audit demo and export checker",
    long_about = "Runs TESSERA training scenarios and verifies exported audit logs:\n\
                  hash-chain integrity, export structure and chain length."
)]
struct Cli {
    /// Store configuration TOML.  Selects the digest used by `verify`.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run both training scenarios in sequence.
    RunAll,
    /// Scenario 1: Authorization Flow (request, approval, tamper detection).
    AuthorizationFlow,
    /// Scenario 2: Safe-Mode Drill (full drill, export, custody re-check).
    SafeModeDrill,
    /// Run the custody check on an exported audit log.
    Verify {
        /// Path to the export JSON.
        file: PathBuf,
    },
    /// Print the length, time span and entry mix of an exported audit log.
    Summarize {
        /// Path to the export JSON.
        file: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-entry output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::RunAll => run_scenarios(true, true),
        Command::AuthorizationFlow => run_scenarios(true, false),
        Command::SafeModeDrill => run_scenarios(false, true),
        Command::Verify { file } => verify_export(file, cli.config.as_deref()),
        Command::Summarize { file } => summarize_export(file).map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("tessera error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_scenarios(authorization: bool, drill: bool) -> TesseraResult<bool> {
    print_banner();
    if authorization {
        authorization_flow::run_scenario()?;
    }
    if drill {
        safe_mode_drill::run_scenario()?;
    }
    println!("All selected scenarios completed successfully.");
    Ok(true)
}

// ── Export commands ───────────────────────────────────────────────────────────

fn custody_checker(config: Option<&Path>) -> TesseraResult<CustodyChecker> {
    match config {
        Some(path) => {
            let config = StoreConfig::from_file(path)?;
            debug!(path = %path.display(), algorithm = %config.digest_algorithm, "store config loaded");
            CustodyChecker::with_digest(config.build_digest()?)
        }
        None => CustodyChecker::new(),
    }
}

/// Returns whether the export is trustworthy.
fn verify_export(path: &Path, config: Option<&Path>) -> TesseraResult<bool> {
    let report = custody_checker(config)?.check_file(path)?;
    print_report(path, &report);
    Ok(report.is_trustworthy())
}

fn print_report(path: &Path, report: &CustodyReport) {
    println!("File:          {}", path.display());

    if report.schema_failures.is_empty() {
        println!("Structure:     OK");
    } else {
        println!("Structure:     {} failure(s)", report.schema_failures.len());
        for failure in &report.schema_failures {
            let at = if failure.path.is_empty() { "(root)" } else { failure.path.as_str() };
            println!("  - {}: {}", at, failure.message);
        }
    }

    if let Some(verification) = &report.verification {
        println!(
            "Chain length:  {}",
            if report.length_matches { "matches" } else { "MISMATCH" }
        );
        match (verification.broken_at_index, verification.reason) {
            (Some(index), Some(reason)) => println!(
                "Integrity:     {} at index {} ({})",
                verification.status_label(),
                index,
                reason
            ),
            _ => println!(
                "Integrity:     {} ({} entries checked)",
                verification.status_label(),
                verification.entries_checked
            ),
        }
    }

    println!(
        "Verdict:       {}",
        if report.is_trustworthy() { "TRUSTWORTHY" } else { "REJECTED" }
    );
}

fn summarize_export(path: &Path) -> TesseraResult<()> {
    let contents = std::fs::read_to_string(path).map_err(|e| TesseraError::Import {
        reason: format!("failed to read audit export '{}': {}", path.display(), e),
    })?;
    let document = from_json::<AuditEntry>(&contents)?;
    let summary = summarize(&document.entries);

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    println!("File:          {}", path.display());
    println!("Exported at:   {}", document.exported_at);
    println!("Version:       {}", document.version);
    println!("Length:        {}", summary.length);
    println!("First entry:   {}", or_dash(summary.first_timestamp.map(|t| t.to_string())));
    println!("Last entry:    {}", or_dash(summary.last_timestamp.map(|t| t.to_string())));
    println!("Last hash:     {}", or_dash(summary.last_hash));

    println!("Entry types:");
    for entry_type in AuditEntryType::ALL {
        let count = document
            .entries
            .iter()
            .filter(|e| e.data.entry_type() == entry_type)
            .count();
        if count > 0 {
            println!("  {:<24} {}", entry_type.as_str(), count);
        }
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("TESSERA: Tamper-evident Training Audit");
    println!("Instructor Station Reference Demo");
    println!("======================================");
    println!();
    println!("Every recorded event becomes one link of a SHA-256 chain:");
    println!("  [1] Genesis entry hashes \"GENESIS:\" + {{timestamp, data}}");
    println!("  [2] Each later entry hashes {{index, timestamp, previousHash, data}}");
    println!("  [3] Verification recomputes every hash and link in order");
    println!("  [4] The first entry that fails marks the earliest point of tampering");
    println!();
}
