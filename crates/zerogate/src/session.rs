//! Session records and the in-memory session table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zerogate_types::{PolicyId, RiskScore, SessionId, TrustLevel};

// ============================================================================
// Session
// ============================================================================

/// The runtime record of a granted access request.
///
/// A session exists in the table only if access was granted at creation
/// time. Ending a session is a soft delete: `active` flips to `false`
/// and the record is retained for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Engine-generated identity.
    pub id: SessionId,
    pub user_id: String,
    pub device_id: String,
    pub application_id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub location: String,
    /// Risk score computed at creation time.
    pub risk_score: RiskScore,
    /// Trust level derived from the risk score.
    pub trust_level: TrustLevel,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    /// IDs of the policies that matched at creation.
    pub applied_policies: Vec<PolicyId>,
    /// Set at creation to "MFA was not required"; flipped to `true` by a
    /// successful verification.
    pub mfa_verified: bool,
    pub active: bool,
}

// ============================================================================
// Session Table
// ============================================================================

/// Arena-style session registry: insertion-ordered records plus an
/// id→index map. Sessions are never removed, so indices are stable.
#[derive(Debug, Default)]
pub(crate) struct SessionTable {
    arena: Vec<Session>,
    index: HashMap<SessionId, usize>,
}

impl SessionTable {
    pub(crate) fn insert(&mut self, session: Session) {
        self.index.insert(session.id, self.arena.len());
        self.arena.push(session);
    }

    /// The session with the given ID, only while it is active.
    pub(crate) fn active(&self, id: SessionId) -> Option<&Session> {
        let slot = *self.index.get(&id)?;
        let session = &self.arena[slot];
        session.active.then_some(session)
    }

    /// Mutable counterpart of [`SessionTable::active`].
    pub(crate) fn active_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        let slot = *self.index.get(&id)?;
        let session = &mut self.arena[slot];
        session.active.then_some(session)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Session> {
        self.arena.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session(active: bool) -> Session {
        let now = Utc::now();
        Session {
            id: SessionId::generate(),
            user_id: "alice".to_string(),
            device_id: "laptop-1".to_string(),
            application_id: "crm".to_string(),
            ip_address: "203.0.113.9".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            location: "office".to_string(),
            risk_score: RiskScore::ZERO,
            trust_level: TrustLevel::High,
            started_at: now,
            last_activity: now,
            applied_policies: Vec::new(),
            mfa_verified: true,
            active,
        }
    }

    #[test]
    fn test_active_mut_filters_inactive() {
        let mut table = SessionTable::default();
        let live = session(true);
        let live_id = live.id;
        let ended = session(false);
        let ended_id = ended.id;
        table.insert(live);
        table.insert(ended);

        assert!(table.active(live_id).is_some());
        assert!(table.active_mut(live_id).is_some());
        assert!(table.active(ended_id).is_none());
        assert!(table.active_mut(ended_id).is_none());
        assert!(table.active_mut(SessionId::generate()).is_none());
        assert_eq!(table.len(), 2, "inactive sessions stay in the table");
    }
}
