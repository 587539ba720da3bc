//! Audit store configuration.
//!
//! `StoreConfig` is deserialized from TOML.  Every field has a default, so an
//! empty document is a valid configuration.
//!
//! Example:
//! ```toml
//! digest_algorithm = "sha256"
//! max_append_retries = 3
//! verify_on_export = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use tessera_contracts::error::{TesseraError, TesseraResult};
use tessera_core::{digest::Sha256Digest, traits::ChainDigest};

/// Tunables for one `AuditStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Digest used for every link.  Only `"sha256"` is supported.
    pub digest_algorithm: String,

    /// How many times an append is retried after losing a race for the
    /// tail before `ConcurrentModification` is returned.
    pub max_append_retries: u32,

    /// Verify the chain snapshot before exporting and log the outcome.
    pub verify_on_export: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: "sha256".to_string(),
            max_append_retries: 3,
            verify_on_export: true,
        }
    }
}

impl StoreConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `TesseraError::ConfigError` if the TOML is malformed, has
    /// unknown keys, or names an unsupported digest.
    pub fn from_toml_str(s: &str) -> TesseraResult<Self> {
        let config: StoreConfig = toml::from_str(s).map_err(|e| TesseraError::ConfigError {
            reason: format!("failed to parse store config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML store configuration.
    pub fn from_file(path: &Path) -> TesseraResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| TesseraError::ConfigError {
            reason: format!("failed to read store config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> TesseraResult<()> {
        self.build_digest().map(|_| ())
    }

    /// Instantiate the configured digest.
    pub fn build_digest(&self) -> TesseraResult<Box<dyn ChainDigest>> {
        match self.digest_algorithm.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Box::new(Sha256Digest)),
            other => Err(TesseraError::ConfigError {
                reason: format!("unsupported digest algorithm '{}'", other),
            }),
        }
    }
}
