//! Audit payloads recorded by the tactical training dashboard.
//!
//! `AuditEntry` is a tagged union over the closed `AuditEntryType`
//! enumeration.  On the wire it is a flat JSON object whose `entryType` field
//! selects the variant:
//!
//! ```json
//! { "entryType": "AUTH_REQUEST_RECEIVED", "timestamp": "...", "requestId": "r1", "details": {} }
//! ```
//!
//! `details` is a `BTreeMap` so its keys always serialize in sorted order,
//! keeping hash preimages deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Free-form detail mapping attached to every audit entry.
pub type Details = BTreeMap<String, serde_json::Value>;

/// The closed set of event kinds the audit chain records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntryType {
    SessionStart,
    SessionEnd,
    AuthRequestReceived,
    AuthDecisionMade,
    AuthTimeout,
    SafeModeActivated,
    SafeModeDeactivated,
    InstructorCommand,
    WeaponsStateChange,
    LinkStatusChange,
    AlertReceived,
    Custom,
}

impl AuditEntryType {
    /// Every entry type, in declaration order.
    pub const ALL: [AuditEntryType; 12] = [
        AuditEntryType::SessionStart,
        AuditEntryType::SessionEnd,
        AuditEntryType::AuthRequestReceived,
        AuditEntryType::AuthDecisionMade,
        AuditEntryType::AuthTimeout,
        AuditEntryType::SafeModeActivated,
        AuditEntryType::SafeModeDeactivated,
        AuditEntryType::InstructorCommand,
        AuditEntryType::WeaponsStateChange,
        AuditEntryType::LinkStatusChange,
        AuditEntryType::AlertReceived,
        AuditEntryType::Custom,
    ];

    /// The wire name, e.g. `"AUTH_DECISION_MADE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntryType::SessionStart => "SESSION_START",
            AuditEntryType::SessionEnd => "SESSION_END",
            AuditEntryType::AuthRequestReceived => "AUTH_REQUEST_RECEIVED",
            AuditEntryType::AuthDecisionMade => "AUTH_DECISION_MADE",
            AuditEntryType::AuthTimeout => "AUTH_TIMEOUT",
            AuditEntryType::SafeModeActivated => "SAFE_MODE_ACTIVATED",
            AuditEntryType::SafeModeDeactivated => "SAFE_MODE_DEACTIVATED",
            AuditEntryType::InstructorCommand => "INSTRUCTOR_COMMAND",
            AuditEntryType::WeaponsStateChange => "WEAPONS_STATE_CHANGE",
            AuditEntryType::LinkStatusChange => "LINK_STATUS_CHANGE",
            AuditEntryType::AlertReceived => "ALERT_RECEIVED",
            AuditEntryType::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for AuditEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an operator authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthDecision {
    Approved,
    Denied,
}

/// Weapons control status of a simulated platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponsState {
    /// Fire only in self-defence or when ordered.
    Hold,
    /// Fire only at targets positively identified as hostile.
    Tight,
    /// Fire at any target not positively identified as friendly.
    Free,
}

/// Data-link status reported for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkStatus {
    Connected,
    Degraded,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// One logged operator, AI, or instructor decision.
///
/// Each variant carries only the fields relevant to its event kind.  Every
/// variant carries `timestamp` (when the event happened, as reported by the
/// producer) and `details`.
///
/// Unknown fields are rejected: a decoded payload must re-serialize to the
/// bytes its hash was computed over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entryType", rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub enum AuditEntry {
    #[serde(rename_all = "camelCase")]
    SessionStart {
        timestamp: Timestamp,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    SessionEnd {
        timestamp: Timestamp,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    AuthRequestReceived {
        timestamp: Timestamp,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    AuthDecisionMade {
        timestamp: Timestamp,
        request_id: String,
        decision: AuthDecision,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    /// No operator answered an authorization request in time.
    #[serde(rename_all = "camelCase")]
    AuthTimeout {
        timestamp: Timestamp,
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    SafeModeActivated {
        timestamp: Timestamp,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    SafeModeDeactivated {
        timestamp: Timestamp,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    InstructorCommand {
        timestamp: Timestamp,
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    WeaponsStateChange {
        timestamp: Timestamp,
        entity_id: String,
        from: WeaponsState,
        to: WeaponsState,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    LinkStatusChange {
        timestamp: Timestamp,
        status: LinkStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    #[serde(rename_all = "camelCase")]
    AlertReceived {
        timestamp: Timestamp,
        severity: AlertSeverity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default)]
        details: Details,
    },

    /// Escape hatch for events outside the closed enumeration.
    #[serde(rename_all = "camelCase")]
    Custom {
        timestamp: Timestamp,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        #[serde(default)]
        details: Details,
    },
}

impl AuditEntry {
    pub fn session_start(timestamp: Timestamp) -> Self {
        AuditEntry::SessionStart { timestamp, details: Details::new() }
    }

    pub fn session_end(timestamp: Timestamp) -> Self {
        AuditEntry::SessionEnd { timestamp, details: Details::new() }
    }

    pub fn auth_request(timestamp: Timestamp, request_id: impl Into<String>) -> Self {
        AuditEntry::AuthRequestReceived {
            timestamp,
            request_id: request_id.into(),
            entity_id: None,
            details: Details::new(),
        }
    }

    pub fn auth_decision(
        timestamp: Timestamp,
        request_id: impl Into<String>,
        decision: AuthDecision,
    ) -> Self {
        AuditEntry::AuthDecisionMade {
            timestamp,
            request_id: request_id.into(),
            decision,
            entity_id: None,
            details: Details::new(),
        }
    }

    pub fn auth_timeout(timestamp: Timestamp, request_id: impl Into<String>) -> Self {
        AuditEntry::AuthTimeout {
            timestamp,
            request_id: request_id.into(),
            entity_id: None,
            details: Details::new(),
        }
    }

    /// `SafeModeActivated` when `active`, otherwise `SafeModeDeactivated`.
    pub fn safe_mode(timestamp: Timestamp, active: bool) -> Self {
        if active {
            AuditEntry::SafeModeActivated { timestamp, details: Details::new() }
        } else {
            AuditEntry::SafeModeDeactivated { timestamp, details: Details::new() }
        }
    }

    pub fn instructor_command(timestamp: Timestamp, command: impl Into<String>) -> Self {
        AuditEntry::InstructorCommand {
            timestamp,
            command: command.into(),
            entity_id: None,
            details: Details::new(),
        }
    }

    pub fn weapons_state_change(
        timestamp: Timestamp,
        entity_id: impl Into<String>,
        from: WeaponsState,
        to: WeaponsState,
    ) -> Self {
        AuditEntry::WeaponsStateChange {
            timestamp,
            entity_id: entity_id.into(),
            from,
            to,
            details: Details::new(),
        }
    }

    pub fn link_status_change(timestamp: Timestamp, status: LinkStatus) -> Self {
        AuditEntry::LinkStatusChange {
            timestamp,
            status,
            entity_id: None,
            details: Details::new(),
        }
    }

    pub fn alert(timestamp: Timestamp, severity: AlertSeverity) -> Self {
        AuditEntry::AlertReceived {
            timestamp,
            severity,
            entity_id: None,
            details: Details::new(),
        }
    }

    pub fn custom(timestamp: Timestamp, label: impl Into<String>) -> Self {
        AuditEntry::Custom {
            timestamp,
            label: label.into(),
            entity_id: None,
            request_id: None,
            details: Details::new(),
        }
    }

    /// Attach a correlated entity identifier.
    ///
    /// Variants without an optional entity slot (`SessionStart`, safe-mode
    /// transitions, and `WeaponsStateChange`, whose entity is mandatory) are
    /// returned unchanged.
    pub fn with_entity(mut self, id: impl Into<String>) -> Self {
        match &mut self {
            AuditEntry::AuthRequestReceived { entity_id, .. }
            | AuditEntry::AuthDecisionMade { entity_id, .. }
            | AuditEntry::AuthTimeout { entity_id, .. }
            | AuditEntry::InstructorCommand { entity_id, .. }
            | AuditEntry::LinkStatusChange { entity_id, .. }
            | AuditEntry::AlertReceived { entity_id, .. }
            | AuditEntry::Custom { entity_id, .. } => *entity_id = Some(id.into()),
            AuditEntry::SessionStart { .. }
            | AuditEntry::SessionEnd { .. }
            | AuditEntry::SafeModeActivated { .. }
            | AuditEntry::SafeModeDeactivated { .. }
            | AuditEntry::WeaponsStateChange { .. } => {}
        }
        self
    }

    /// Insert one key into `details`, replacing any previous value.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details_mut().insert(key.into(), value.into());
        self
    }

    pub fn entry_type(&self) -> AuditEntryType {
        match self {
            AuditEntry::SessionStart { .. } => AuditEntryType::SessionStart,
            AuditEntry::SessionEnd { .. } => AuditEntryType::SessionEnd,
            AuditEntry::AuthRequestReceived { .. } => AuditEntryType::AuthRequestReceived,
            AuditEntry::AuthDecisionMade { .. } => AuditEntryType::AuthDecisionMade,
            AuditEntry::AuthTimeout { .. } => AuditEntryType::AuthTimeout,
            AuditEntry::SafeModeActivated { .. } => AuditEntryType::SafeModeActivated,
            AuditEntry::SafeModeDeactivated { .. } => AuditEntryType::SafeModeDeactivated,
            AuditEntry::InstructorCommand { .. } => AuditEntryType::InstructorCommand,
            AuditEntry::WeaponsStateChange { .. } => AuditEntryType::WeaponsStateChange,
            AuditEntry::LinkStatusChange { .. } => AuditEntryType::LinkStatusChange,
            AuditEntry::AlertReceived { .. } => AuditEntryType::AlertReceived,
            AuditEntry::Custom { .. } => AuditEntryType::Custom,
        }
    }

    /// When the event happened, as reported by its producer.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            AuditEntry::SessionStart { timestamp, .. }
            | AuditEntry::SessionEnd { timestamp, .. }
            | AuditEntry::AuthRequestReceived { timestamp, .. }
            | AuditEntry::AuthDecisionMade { timestamp, .. }
            | AuditEntry::AuthTimeout { timestamp, .. }
            | AuditEntry::SafeModeActivated { timestamp, .. }
            | AuditEntry::SafeModeDeactivated { timestamp, .. }
            | AuditEntry::InstructorCommand { timestamp, .. }
            | AuditEntry::WeaponsStateChange { timestamp, .. }
            | AuditEntry::LinkStatusChange { timestamp, .. }
            | AuditEntry::AlertReceived { timestamp, .. }
            | AuditEntry::Custom { timestamp, .. } => *timestamp,
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            AuditEntry::WeaponsStateChange { entity_id, .. } => Some(entity_id.as_str()),
            AuditEntry::AuthRequestReceived { entity_id, .. }
            | AuditEntry::AuthDecisionMade { entity_id, .. }
            | AuditEntry::AuthTimeout { entity_id, .. }
            | AuditEntry::InstructorCommand { entity_id, .. }
            | AuditEntry::LinkStatusChange { entity_id, .. }
            | AuditEntry::AlertReceived { entity_id, .. }
            | AuditEntry::Custom { entity_id, .. } => entity_id.as_deref(),
            AuditEntry::SessionStart { .. }
            | AuditEntry::SessionEnd { .. }
            | AuditEntry::SafeModeActivated { .. }
            | AuditEntry::SafeModeDeactivated { .. } => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            AuditEntry::AuthRequestReceived { request_id, .. }
            | AuditEntry::AuthDecisionMade { request_id, .. }
            | AuditEntry::AuthTimeout { request_id, .. } => Some(request_id.as_str()),
            AuditEntry::Custom { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub fn details(&self) -> &Details {
        match self {
            AuditEntry::SessionStart { details, .. }
            | AuditEntry::SessionEnd { details, .. }
            | AuditEntry::AuthRequestReceived { details, .. }
            | AuditEntry::AuthDecisionMade { details, .. }
            | AuditEntry::AuthTimeout { details, .. }
            | AuditEntry::SafeModeActivated { details, .. }
            | AuditEntry::SafeModeDeactivated { details, .. }
            | AuditEntry::InstructorCommand { details, .. }
            | AuditEntry::WeaponsStateChange { details, .. }
            | AuditEntry::LinkStatusChange { details, .. }
            | AuditEntry::AlertReceived { details, .. }
            | AuditEntry::Custom { details, .. } => details,
        }
    }

    fn details_mut(&mut self) -> &mut Details {
        match self {
            AuditEntry::SessionStart { details, .. }
            | AuditEntry::SessionEnd { details, .. }
            | AuditEntry::AuthRequestReceived { details, .. }
            | AuditEntry::AuthDecisionMade { details, .. }
            | AuditEntry::AuthTimeout { details, .. }
            | AuditEntry::SafeModeActivated { details, .. }
            | AuditEntry::SafeModeDeactivated { details, .. }
            | AuditEntry::InstructorCommand { details, .. }
            | AuditEntry::WeaponsStateChange { details, .. }
            | AuditEntry::LinkStatusChange { details, .. }
            | AuditEntry::AlertReceived { details, .. }
            | AuditEntry::Custom { details, .. } => details,
        }
    }
}
