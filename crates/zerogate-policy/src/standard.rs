//! Built-in startup policies.
//!
//! Installed by the engine at construction time (configurable); they can
//! be inspected, updated, or removed through the normal admin operations
//! afterwards.

use serde_json::json;

use crate::model::{Action, Condition, Field, Operator, PolicyDraft, PolicyKind};

/// The default policy set for a freshly constructed engine.
///
/// 1. `block-critical-risk` — deny outright above a risk score of 80.
/// 2. `mfa-elevated-risk` — step-up authentication above 50.
/// 3. `deny-untrusted-network` — deny low-trust sessions from public or
///    unknown locations.
/// 4. `log-all-access` — unconditional audit trail, evaluated last.
pub fn default_policies() -> Vec<PolicyDraft> {
    vec![
        PolicyDraft::new("block-critical-risk", PolicyKind::Network, 1)
            .with_description("Deny access when the session risk score is critical")
            .with_condition(Condition {
                field: Field::RiskScore,
                op: Operator::GreaterThan(80.0),
            })
            .with_action(Action::Deny)
            .with_tag("risk"),
        PolicyDraft::new("mfa-elevated-risk", PolicyKind::User, 5)
            .with_description("Require MFA when the session risk score is elevated")
            .with_condition(Condition {
                field: Field::RiskScore,
                op: Operator::GreaterThan(50.0),
            })
            .with_action(Action::RequireMfa)
            .with_tag("risk")
            .with_tag("mfa"),
        PolicyDraft::new("deny-untrusted-network", PolicyKind::Network, 10)
            .with_description("Deny low-trust sessions originating from untrusted locations")
            .with_condition(Condition {
                field: Field::Location,
                op: Operator::In(vec![json!("public"), json!("unknown")]),
            })
            .with_condition(Condition {
                field: Field::TrustLevel,
                op: Operator::Equals(json!("low")),
            })
            .with_action(Action::Deny)
            .with_tag("network"),
        PolicyDraft::new("log-all-access", PolicyKind::Application, 100)
            .with_description("Record every evaluated access request")
            .with_action(Action::Log)
            .with_tag("audit"),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvaluationContext;
    use crate::evaluator::evaluate;
    use crate::store::PolicyStore;
    use zerogate_types::RiskScore;

    #[test]
    fn test_default_policy_structure() {
        let drafts = default_policies();
        assert_eq!(drafts.len(), 4);

        // The critical-risk deny evaluates before everything else.
        assert_eq!(drafts[0].name, "block-critical-risk");
        assert_eq!(drafts[0].priority, 1);
        assert!(drafts.iter().all(|d| d.enabled));

        // The catch-all logger evaluates last.
        let last = drafts.last().expect("non-empty default set");
        assert_eq!(last.name, "log-all-access");
        assert!(last.conditions.is_empty());
    }

    #[test]
    fn test_critical_risk_is_denied() {
        let store = PolicyStore::with_policies(default_policies());
        let ctx = EvaluationContext::new("mallory", "kiosk", "crm")
            .with_network("198.51.100.7", "curl/8.0", "office")
            .with_risk(RiskScore::new(95));

        let decision = evaluate(&store.evaluation_snapshot(), &ctx);
        assert!(!decision.access_granted);
        assert_eq!(decision.reason, "Policy block-critical-risk denied access");
    }

    #[test]
    fn test_elevated_risk_requires_mfa_but_grants() {
        let store = PolicyStore::with_policies(default_policies());
        let ctx = EvaluationContext::new("bob", "laptop-2", "wiki")
            .with_network("198.51.100.7", "Mozilla/5.0", "home")
            .with_risk(RiskScore::new(60));

        let decision = evaluate(&store.evaluation_snapshot(), &ctx);
        assert!(decision.access_granted);
        assert!(decision.mfa_required());
    }

    #[test]
    fn test_low_trust_public_location_is_denied() {
        let store = PolicyStore::with_policies(default_policies());
        // Score 55 => trust level low, but below the critical threshold.
        let ctx = EvaluationContext::new("carol", "phone-3", "mail")
            .with_network("192.0.2.4", "Mozilla/5.0", "public")
            .with_risk(RiskScore::new(55));

        let decision = evaluate(&store.evaluation_snapshot(), &ctx);
        assert!(!decision.access_granted);
        assert_eq!(
            decision.reason,
            "Policy deny-untrusted-network denied access"
        );
        // The MFA policy matched before the deny, so its action is kept.
        assert!(decision.mfa_required());
    }

    #[test]
    fn test_clean_session_is_logged_and_granted() {
        let store = PolicyStore::with_policies(default_policies());
        let ctx = EvaluationContext::new("dave", "laptop-4", "crm")
            .with_network("203.0.113.2", "Mozilla/5.0", "office")
            .with_risk(RiskScore::ZERO);

        let decision = evaluate(&store.evaluation_snapshot(), &ctx);
        assert!(decision.access_granted);
        assert!(!decision.mfa_required());
        assert_eq!(decision.applied_policies.len(), 1, "only the catch-all logger");
        assert_eq!(decision.actions, vec![Action::Log]);
    }
}
