//! JSON Schema of the audit export document.

use serde_json::{json, Value};

use tessera_contracts::{export::EXPORT_FORMAT_VERSION, payload::AuditEntryType};

/// The only timestamp form a writer emits: UTC, exactly three fractional
/// digits, `Z` suffix.  Any other spelling of the same instant would decode
/// to the same value and hide an edit from the hash check.
const TIMESTAMP_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$";

/// Lowercase hex digest of any length.
const HASH_PATTERN: &str = "^[0-9a-f]+$";

/// The schema an export document must satisfy before its chain is decoded.
///
/// It pins the envelope and entry shape, the canonical timestamp form and the
/// closed set of entry types.  Per-variant payload fields are left to
/// deserialization, which rejects unknown ones.
pub fn export_document_schema() -> Value {
    let entry_types: Vec<&str> = AuditEntryType::ALL.iter().map(|t| t.as_str()).collect();

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "TESSERA audit export",
        "type": "object",
        "required": ["exportedAt", "version", "chainLength", "entries"],
        "additionalProperties": false,
        "properties": {
            "exportedAt": { "type": "string", "pattern": TIMESTAMP_PATTERN },
            "version": { "const": EXPORT_FORMAT_VERSION },
            "chainLength": { "type": "integer", "minimum": 0 },
            "entries": {
                "type": "array",
                "items": { "$ref": "#/$defs/entry" }
            }
        },
        "$defs": {
            "entry": {
                "type": "object",
                "required": ["index", "timestamp", "previousHash", "hash", "data"],
                "additionalProperties": false,
                "properties": {
                    "index": { "type": "integer", "minimum": 0 },
                    "timestamp": { "type": "string", "pattern": TIMESTAMP_PATTERN },
                    "previousHash": { "type": "string", "minLength": 1 },
                    "hash": { "type": "string", "pattern": HASH_PATTERN },
                    "data": { "$ref": "#/$defs/auditEntry" }
                }
            },
            "auditEntry": {
                "type": "object",
                "required": ["entryType", "timestamp", "details"],
                "properties": {
                    "entryType": { "enum": entry_types },
                    "timestamp": { "type": "string", "pattern": TIMESTAMP_PATTERN },
                    "requestId": { "type": "string" },
                    "entityId": { "type": "string" },
                    "details": { "type": "object" }
                }
            }
        }
    })
}
