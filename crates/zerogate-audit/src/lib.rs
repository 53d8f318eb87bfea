//! # zerogate-audit: bounded append-only audit log
//!
//! Records session lifecycle and policy decision events. The log is
//! append-only — events are never mutated — but unlike a compliance
//! archive it is **size-bounded**: it retains at most the configured
//! number of most-recent events and evicts the oldest in one batch when
//! the cap is exceeded (FIFO, never the most recent).
//!
//! ```text
//! EventLog = {
//!     events: Vec<AuditEvent>,        // append-only, FIFO-evicted
//!     append(event),                  // drains oldest above the cap
//!     query(filter) -> Vec<&Event>,   // full-scan AND filtering
//!     counts_by_kind() -> map,        // for engine stats
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use zerogate_audit::{AuditEvent, EventKind, EventLog, EventQuery};
//! use zerogate_types::{RiskScore, SessionId};
//!
//! let mut log = EventLog::new(10_000);
//! let session = SessionId::generate();
//! log.append(AuditEvent::new(
//!     session,
//!     "alice",
//!     EventKind::SessionStart,
//!     RiskScore::new(12),
//! ));
//!
//! let events = log.query(&EventQuery::default().with_session(session));
//! assert_eq!(events.len(), 1);
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use zerogate_types::{RiskScore, SessionId};

/// Default retention cap: the 10 000 most-recent events.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

// ============================================================================
// Event Kind
// ============================================================================

/// The category of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A session was created after a granted access request.
    SessionStart,
    /// A session was explicitly ended.
    SessionEnd,
    /// The policy set was evaluated for a request.
    PolicyEvaluation,
    /// An access request was granted.
    AccessGranted,
    /// An access request was denied.
    AccessDenied,
    /// Multi-factor authentication was required or checked.
    MfaRequired,
    /// A risk assessment was computed.
    RiskAssessment,
}

impl EventKind {
    /// Canonical snake_case name, as used in stats maps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionStart => "session_start",
            Self::SessionEnd => "session_end",
            Self::PolicyEvaluation => "policy_evaluation",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::MfaRequired => "mfa_required",
            Self::RiskAssessment => "risk_assessment",
        }
    }
}

// ============================================================================
// Audit Event
// ============================================================================

/// A single audit event with full context.
///
/// Once appended to the log an event is immutable; all fields are set at
/// creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The session this event belongs to.
    pub session_id: SessionId,
    /// The user the session belongs to.
    pub user_id: String,
    /// What happened.
    pub kind: EventKind,
    /// Opaque structured context (duration, reason, applied policies...).
    pub details: serde_json::Map<String, serde_json::Value>,
    /// Risk score snapshot at the time of the event.
    pub risk_score: RiskScore,
}

impl AuditEvent {
    /// Creates an event timestamped now, with empty details.
    pub fn new(session_id: SessionId, user_id: &str, kind: EventKind, risk_score: RiskScore) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id,
            user_id: user_id.to_string(),
            kind,
            details: serde_json::Map::new(),
            risk_score,
        }
    }

    /// Attaches a detail entry (builder pattern).
    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }
}

// ============================================================================
// Event Query
// ============================================================================

/// Query filter for the event log.
///
/// All fields are optional; set fields combine with AND logic. Results
/// come back in insertion (chronological) order.
#[derive(Debug, Default, Clone)]
pub struct EventQuery {
    pub session_id: Option<SessionId>,
    pub kind: Option<EventKind>,
    pub time_from: Option<DateTime<Utc>>,
    pub time_to: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

impl EventQuery {
    /// Filter by session.
    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// Filter by event kind.
    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Filter to events within a time range (inclusive).
    pub fn with_time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.time_from = Some(from);
        self.time_to = Some(to);
        self
    }

    /// Filter by user.
    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Limit the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// ============================================================================
// Event Log
// ============================================================================

/// Size-bounded, append-only audit log.
///
/// The API provides no mutation or deletion of individual events; the
/// only way an event leaves the log is FIFO eviction past the cap.
#[derive(Debug)]
pub struct EventLog {
    events: Vec<AuditEvent>,
    max_events: usize,
}

impl EventLog {
    /// Creates an empty log retaining at most `max_events` entries.
    ///
    /// A cap of zero is coerced to one so that the most recent event is
    /// always observable.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events: max_events.max(1),
        }
    }

    /// Appends an event, evicting the oldest excess entries in one batch
    /// so the log never exceeds its cap.
    pub fn append(&mut self, event: AuditEvent) {
        self.events.push(event);
        if self.events.len() > self.max_events {
            let excess = self.events.len() - self.max_events;
            self.events.drain(0..excess);
        }
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The configured retention cap.
    pub fn capacity(&self) -> usize {
        self.max_events
    }

    /// Events matching the filter, in chronological order.
    pub fn query(&self, filter: &EventQuery) -> Vec<&AuditEvent> {
        let mut results: Vec<&AuditEvent> = self
            .events
            .iter()
            .filter(|event| Self::matches(event, filter))
            .collect();
        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }
        results
    }

    /// Event counts per kind, for engine stats.
    pub fn counts_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for event in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Exports the matching events as a JSON array.
    pub fn export_json(&self, filter: &EventQuery) -> Result<String> {
        let events = self.query(filter);
        Ok(serde_json::to_string_pretty(&events)?)
    }

    fn matches(event: &AuditEvent, filter: &EventQuery) -> bool {
        if let Some(session_id) = filter.session_id {
            if event.session_id != session_id {
                return false;
            }
        }
        if let Some(kind) = filter.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(from) = filter.time_from {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(to) = filter.time_to {
            if event.timestamp > to {
                return false;
            }
        }
        if let Some(user_id) = &filter.user_id {
            if event.user_id != *user_id {
                return false;
            }
        }
        true
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS)
    }
}

// ============================================================================
// Tests
// ============================================================================
