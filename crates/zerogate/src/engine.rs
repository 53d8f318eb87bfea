//! Session manager: the engine facade.
//!
//! Owns the three state collections (policy store, session table, event
//! log) behind per-collection locks and drives the whole access flow:
//!
//! ```text
//! create_session(request)
//!     │
//!     ├─ risk::score(device_info, user_info, location)
//!     ├─ EvaluationContext + PolicyStore::evaluation_snapshot()
//!     ├─ evaluate(..)  ── deny ──► AccessDenied event, no session stored
//!     │        │
//!     │      grant
//!     │        ▼
//!     └─ Session inserted, SessionStart event appended
//! ```
//!
//! Evaluation itself runs lock-free on a snapshot; locks are held only
//! for the brief reads/writes around it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use zerogate_audit::{AuditEvent, EventKind, EventLog, EventQuery};
use zerogate_config::EngineConfig;
use zerogate_policy::{
    EvaluationContext, Policy, PolicyDecision, PolicyDraft, PolicyStore, PolicyUpdate, evaluate,
    risk, standard,
};
use zerogate_types::{PolicyId, RiskScore, SessionId, TrustLevel};

use crate::error::{EngineError, Result};
use crate::mfa::{MfaVerifier, StaticMfaVerifier};
use crate::session::{Session, SessionTable};

// ============================================================================
// Request / Response
// ============================================================================

/// Inbound access request, carrying identity plus raw posture signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub device_id: String,
    pub application_id: String,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub location: String,
    /// Device posture signals (e.g. `os_version`, `antivirus_updated`).
    #[serde(default)]
    pub device_info: Map<String, Value>,
    /// User behavior signals (e.g. `last_login_days`, `failed_attempts`).
    #[serde(default)]
    pub user_info: Map<String, Value>,
}

/// Outcome of an access request.
///
/// `session_id` is minted for every request, granted or not, so callers
/// can correlate the decision with audit events. Only granted requests
/// have a stored session behind the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
    pub access_granted: bool,
    pub reason: String,
    pub risk_score: RiskScore,
    pub trust_level: TrustLevel,
    /// Whether a matching policy demanded multi-factor authentication.
    pub mfa_required: bool,
    /// IDs of the policies that matched, in evaluation order.
    pub applied_policies: Vec<PolicyId>,
}

/// Point-in-time engine counters for dashboards and health checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_policies: usize,
    pub active_sessions: usize,
    pub total_sessions: usize,
    pub sessions_by_trust_level: HashMap<TrustLevel, usize>,
    pub events_by_kind: HashMap<EventKind, usize>,
}

// ============================================================================
// Session Manager
// ============================================================================

/// Thread-safe engine facade.
///
/// Cloning is cheap: clones share the same underlying state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    policies: RwLock<PolicyStore>,
    sessions: RwLock<SessionTable>,
    events: RwLock<EventLog>,
    mfa: Box<dyn MfaVerifier>,
}

impl SessionManager {
    /// Creates an engine from configuration with the reference MFA
    /// verifier.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_verifier(config, Box::new(StaticMfaVerifier))
    }

    /// Creates an engine with a caller-provided MFA verifier.
    pub fn with_verifier(config: &EngineConfig, mfa: Box<dyn MfaVerifier>) -> Self {
        let policies = if config.policies.install_defaults {
            PolicyStore::with_policies(standard::default_policies())
        } else {
            PolicyStore::new()
        };
        info!(
            policies = policies.len(),
            max_events = config.audit.max_events,
            "session manager initialized"
        );
        Self {
            inner: Arc::new(Inner {
                policies: RwLock::new(policies),
                sessions: RwLock::new(SessionTable::default()),
                events: RwLock::new(EventLog::new(config.audit.max_events)),
                mfa,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Scores the request, evaluates every enabled policy against it, and
    /// either opens a session (grant) or records the refusal (deny).
    pub fn create_session(&self, request: CreateSessionRequest) -> Result<CreateSessionResponse> {
        let risk_score = risk::score(&request.device_info, &request.user_info, &request.location);
        let trust_level = TrustLevel::from_score(risk_score);

        let ctx = EvaluationContext::new(
            &request.user_id,
            &request.device_id,
            &request.application_id,
        )
        .with_network(&request.ip_address, &request.user_agent, &request.location)
        .with_risk(risk_score)
        .with_device_info(request.device_info.clone())
        .with_user_info(request.user_info.clone());

        let snapshot = self.read_policies()?.evaluation_snapshot();
        let decision = evaluate(&snapshot, &ctx);
        let mfa_required = decision.mfa_required();
        let session_id = SessionId::generate();

        if decision.access_granted {
            self.admit_session(session_id, &request, risk_score, trust_level, &decision)?;
        } else {
            warn!(
                session_id = %session_id,
                user_id = %request.user_id,
                risk_score = %risk_score,
                reason = %decision.reason,
                "access denied"
            );
            self.append_event(
                AuditEvent::new(session_id, &request.user_id, EventKind::AccessDenied, risk_score)
                    .with_detail("reason", json!(decision.reason))
                    .with_detail("application_id", json!(request.application_id)),
            )?;
        }

        Ok(CreateSessionResponse {
            session_id,
            access_granted: decision.access_granted,
            reason: decision.reason,
            risk_score,
            trust_level,
            mfa_required,
            applied_policies: decision.applied_policies,
        })
    }

    fn admit_session(
        &self,
        session_id: SessionId,
        request: &CreateSessionRequest,
        risk_score: RiskScore,
        trust_level: TrustLevel,
        decision: &PolicyDecision,
    ) -> Result<()> {
        let now = Utc::now();
        let mfa_required = decision.mfa_required();
        let session = Session {
            id: session_id,
            user_id: request.user_id.clone(),
            device_id: request.device_id.clone(),
            application_id: request.application_id.clone(),
            ip_address: request.ip_address.clone(),
            user_agent: request.user_agent.clone(),
            location: request.location.clone(),
            risk_score,
            trust_level,
            started_at: now,
            last_activity: now,
            applied_policies: decision.applied_policies.clone(),
            mfa_verified: !mfa_required,
            active: true,
        };
        self.write_sessions()?.insert(session);

        info!(
            session_id = %session_id,
            user_id = %request.user_id,
            risk_score = %risk_score,
            trust_level = %trust_level,
            mfa_required,
            "session started"
        );
        self.append_event(
            AuditEvent::new(session_id, &request.user_id, EventKind::SessionStart, risk_score)
                .with_detail("application_id", json!(request.application_id))
                .with_detail("trust_level", json!(trust_level))
                .with_detail("mfa_required", json!(mfa_required)),
        )
    }

    /// Bumps the activity timestamp of an active session.
    ///
    /// Returns `false` if the session is unknown or already ended.
    pub fn update_session_activity(&self, session_id: SessionId) -> Result<bool> {
        let mut sessions = self.write_sessions()?;
        match sessions.active_mut(session_id) {
            Some(session) => {
                session.last_activity = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Verifies an MFA token against the injected verifier and, on
    /// success, marks the session as MFA-verified.
    ///
    /// Returns `false` for unknown/ended sessions and rejected tokens.
    pub fn verify_mfa(&self, session_id: SessionId, token: &str) -> Result<bool> {
        if self.read_sessions()?.active(session_id).is_none() {
            return Ok(false);
        }

        // Verifiers may do slow outbound work, so no lock is held across
        // the token check.
        if !self.inner.mfa.verify(session_id, token) {
            return Ok(false);
        }

        let (user_id, risk_score) = {
            let mut sessions = self.write_sessions()?;
            // The session may have ended while the verifier ran.
            let Some(session) = sessions.active_mut(session_id) else {
                return Ok(false);
            };
            session.mfa_verified = true;
            session.last_activity = Utc::now();
            (session.user_id.clone(), session.risk_score)
        };

        info!(session_id = %session_id, user_id = %user_id, "mfa verified");
        self.append_event(
            AuditEvent::new(session_id, &user_id, EventKind::MfaRequired, risk_score)
                .with_detail("verified", json!(true)),
        )?;
        Ok(true)
    }

    /// Ends an active session (soft delete; the record stays queryable).
    ///
    /// Returns `false` if the session is unknown or already ended.
    pub fn end_session(&self, session_id: SessionId) -> Result<bool> {
        let (user_id, risk_score, duration_secs) = {
            let mut sessions = self.write_sessions()?;
            let Some(session) = sessions.active_mut(session_id) else {
                return Ok(false);
            };
            session.active = false;
            session.last_activity = Utc::now();
            (
                session.user_id.clone(),
                session.risk_score,
                (session.last_activity - session.started_at).num_seconds(),
            )
        };

        info!(session_id = %session_id, user_id = %user_id, duration_secs, "session ended");
        self.append_event(
            AuditEvent::new(session_id, &user_id, EventKind::SessionEnd, risk_score)
                .with_detail("duration_secs", json!(duration_secs)),
        )?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// All currently active sessions.
    pub fn active_sessions(&self) -> Result<Vec<Session>> {
        let sessions = self.read_sessions()?;
        Ok(sessions.iter().filter(|s| s.active).cloned().collect())
    }

    /// Every session (active or ended) belonging to a user.
    pub fn sessions_by_user(&self, user_id: &str) -> Result<Vec<Session>> {
        let sessions = self.read_sessions()?;
        Ok(sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Audit events matching the query, oldest first.
    pub fn events(&self, query: &EventQuery) -> Result<Vec<AuditEvent>> {
        let events = self.read_events()?;
        Ok(events.query(query).into_iter().cloned().collect())
    }

    /// Point-in-time counters across all three collections.
    pub fn stats(&self) -> Result<EngineStats> {
        let total_policies = self.read_policies()?.len();
        let events_by_kind = self.read_events()?.counts_by_kind();

        let sessions = self.read_sessions()?;
        let mut sessions_by_trust_level: HashMap<TrustLevel, usize> = HashMap::new();
        let mut active_sessions = 0;
        for session in sessions.iter() {
            if session.active {
                active_sessions += 1;
                *sessions_by_trust_level.entry(session.trust_level).or_default() += 1;
            }
        }

        Ok(EngineStats {
            total_policies,
            active_sessions,
            total_sessions: sessions.len(),
            sessions_by_trust_level,
            events_by_kind,
        })
    }

    // ------------------------------------------------------------------
    // Policy administration
    // ------------------------------------------------------------------

    /// Registers a policy and returns its assigned ID.
    pub fn add_policy(&self, draft: PolicyDraft) -> Result<PolicyId> {
        let id = self.write_policies()?.add(draft);
        info!(policy_id = %id, "policy added");
        Ok(id)
    }

    /// Applies a partial update; returns `false` if the ID is unknown.
    pub fn update_policy(&self, id: PolicyId, update: PolicyUpdate) -> Result<bool> {
        let updated = self.write_policies()?.update(id, update);
        if updated {
            info!(policy_id = %id, "policy updated");
        }
        Ok(updated)
    }

    /// Removes a policy; returns `false` if the ID is unknown.
    pub fn remove_policy(&self, id: PolicyId) -> Result<bool> {
        let removed = self.write_policies()?.remove(id);
        if removed {
            info!(policy_id = %id, "policy removed");
        }
        Ok(removed)
    }

    /// A snapshot of all registered policies in insertion order.
    pub fn policies(&self) -> Result<Vec<Policy>> {
        Ok(self.read_policies()?.all().to_vec())
    }

    // ------------------------------------------------------------------
    // Lock plumbing
    // ------------------------------------------------------------------

    fn append_event(&self, event: AuditEvent) -> Result<()> {
        self.inner
            .events
            .write()
            .map_err(|_| EngineError::internal("event log lock poisoned"))?
            .append(event);
        Ok(())
    }

    fn read_policies(&self) -> Result<std::sync::RwLockReadGuard<'_, PolicyStore>> {
        self.inner
            .policies
            .read()
            .map_err(|_| EngineError::internal("policy store lock poisoned"))
    }

    fn write_policies(&self) -> Result<std::sync::RwLockWriteGuard<'_, PolicyStore>> {
        self.inner
            .policies
            .write()
            .map_err(|_| EngineError::internal("policy store lock poisoned"))
    }

    fn read_sessions(&self) -> Result<std::sync::RwLockReadGuard<'_, SessionTable>> {
        self.inner
            .sessions
            .read()
            .map_err(|_| EngineError::internal("session table lock poisoned"))
    }

    fn write_sessions(&self) -> Result<std::sync::RwLockWriteGuard<'_, SessionTable>> {
        self.inner
            .sessions
            .write()
            .map_err(|_| EngineError::internal("session table lock poisoned"))
    }

    fn read_events(&self) -> Result<std::sync::RwLockReadGuard<'_, EventLog>> {
        self.inner
            .events
            .read()
            .map_err(|_| EngineError::internal("event log lock poisoned"))
    }
}

// ============================================================================
// Tests
// ============================================================================
