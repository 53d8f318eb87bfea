//! Policy evaluation engine.
//!
//! Walks the enabled policies in ascending priority order, accumulating
//! the actions of every matching policy. A matching policy that carries a
//! deny action short-circuits evaluation: later policies are never
//! consulted. This is first-deny-wins, otherwise-union-of-actions — not
//! first-match-wins.

use serde_json::Value;
use tracing::debug;
use zerogate_types::PolicyId;

use crate::context::EvaluationContext;
use crate::model::{Action, Condition, Operator, Policy};

// ============================================================================
// Decision
// ============================================================================

/// The result of evaluating a request context against the policy set.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    /// Whether access is granted.
    pub access_granted: bool,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// Actions accumulated from every matching policy, in priority order,
    /// up to and including the first denying policy.
    pub actions: Vec<Action>,
    /// IDs of every policy that matched, in evaluation order.
    pub applied_policies: Vec<PolicyId>,
}

impl PolicyDecision {
    /// Whether the accumulated actions demand multi-factor authentication.
    ///
    /// Independent of the grant/deny outcome: a denied request can still
    /// report that MFA would have been required.
    pub fn mfa_required(&self) -> bool {
        self.actions.iter().any(Action::requires_mfa)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluates a request context against a snapshot of the policy set.
///
/// Disabled policies are skipped. Policies run in ascending priority
/// order (lower value first); equal priorities keep their insertion
/// order. Each matching policy appends its actions; the first matching
/// policy containing a deny stops evaluation and denies access. If no
/// policy matches at all, access is granted with a single implicit
/// [`Action::Log`].
///
/// # Postcondition
///
/// Total over any stored policy data — never panics, never errors.
pub fn evaluate(policies: &[Policy], ctx: &EvaluationContext) -> PolicyDecision {
    let mut ordered: Vec<&Policy> = policies.iter().filter(|p| p.enabled).collect();
    // Stable sort: insertion order breaks priority ties.
    ordered.sort_by_key(|p| p.priority);

    let mut actions = Vec::new();
    let mut applied_policies = Vec::new();

    for policy in ordered {
        let matched = policy.conditions.iter().all(|c| condition_matches(c, ctx));
        if !matched {
            continue;
        }

        debug!(
            policy = %policy.name,
            priority = policy.priority,
            "policy matched"
        );

        applied_policies.push(policy.id);
        actions.extend(policy.actions.iter().cloned());

        if policy.denies() {
            return PolicyDecision {
                access_granted: false,
                reason: format!("Policy {} denied access", policy.name),
                actions,
                applied_policies,
            };
        }
    }

    if applied_policies.is_empty() {
        // No policy had an opinion; grant, but leave an audit trail.
        actions.push(Action::Log);
    }

    PolicyDecision {
        access_granted: true,
        reason: "Access granted based on policies".to_string(),
        actions,
        applied_policies,
    }
}

/// Evaluates a single condition against the context.
///
/// An absent field value makes every operator false; type mismatches
/// (string operator on a number, numeric operator on a non-numeric
/// string) are false, never an error.
pub fn condition_matches(condition: &Condition, ctx: &EvaluationContext) -> bool {
    let Some(value) = ctx.resolve(&condition.field) else {
        return false;
    };

    match &condition.op {
        Operator::Equals(expected) => value == *expected,
        Operator::Contains(needle) => value.as_str().is_some_and(|s| s.contains(needle)),
        Operator::StartsWith(prefix) => value.as_str().is_some_and(|s| s.starts_with(prefix)),
        Operator::EndsWith(suffix) => value.as_str().is_some_and(|s| s.ends_with(suffix)),
        Operator::In(set) => set.contains(&value),
        Operator::NotIn(set) => !set.contains(&value),
        Operator::GreaterThan(bound) => as_number(&value).is_some_and(|n| n > *bound),
        Operator::LessThan(bound) => as_number(&value).is_some_and(|n| n < *bound),
    }
}

/// Numeric view of a value: JSON numbers directly, strings that parse as
/// f64 (version strings like `"9.0"` arrive as text). Everything else is
/// non-numeric.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, PolicyDraft, PolicyKind};
    use crate::store::PolicyStore;
    use serde_json::json;
    use zerogate_types::RiskScore;

    fn ctx_with_risk(score: u32) -> EvaluationContext {
        EvaluationContext::new("alice", "laptop-1", "crm")
            .with_network("203.0.113.9", "Mozilla/5.0", "office")
            .with_risk(RiskScore::new(score))
    }

    fn cond(field: Field, op: Operator) -> Condition {
        Condition { field, op }
    }

    #[test]
    fn test_operator_equals_strict() {
        let ctx = ctx_with_risk(0).with_user_info(
            [("role".to_string(), json!("admin"))].into_iter().collect(),
        );

        assert!(condition_matches(
            &cond(Field::UserRole, Operator::Equals(json!("admin"))),
            &ctx
        ));
        assert!(!condition_matches(
            &cond(Field::UserRole, Operator::Equals(json!("auditor"))),
            &ctx
        ));
        // Strict equality: a string never equals a number.
        assert!(!condition_matches(
            &cond(Field::UserRole, Operator::Equals(json!(1))),
            &ctx
        ));
    }

    #[test]
    fn test_string_operators_are_string_only() {
        let ctx = ctx_with_risk(0).with_network("203.0.113.9", "Mozilla/5.0 (X11; Linux)", "office");

        assert!(condition_matches(
            &cond(Field::UserAgent, Operator::Contains("Linux".to_string())),
            &ctx
        ));
        assert!(condition_matches(
            &cond(Field::UserAgent, Operator::StartsWith("Mozilla".to_string())),
            &ctx
        ));
        assert!(condition_matches(
            &cond(Field::IpAddress, Operator::EndsWith(".9".to_string())),
            &ctx
        ));

        // RiskScore resolves to a number, so string operators are false.
        assert!(!condition_matches(
            &cond(Field::RiskScore, Operator::Contains("0".to_string())),
            &ctx
        ));
    }

    #[test]
    fn test_membership_operators() {
        let ctx = ctx_with_risk(0).with_network("", "", "public");

        assert!(condition_matches(
            &cond(
                Field::Location,
                Operator::In(vec![json!("public"), json!("unknown")])
            ),
            &ctx
        ));
        assert!(!condition_matches(
            &cond(
                Field::Location,
                Operator::NotIn(vec![json!("public"), json!("unknown")])
            ),
            &ctx
        ));
        assert!(condition_matches(
            &cond(Field::Location, Operator::NotIn(vec![json!("office")])),
            &ctx
        ));
    }

    #[test]
    fn test_numeric_operators_accept_numeric_strings() {
        let ctx = ctx_with_risk(0).with_device_info(
            [("os_version".to_string(), json!("9.0"))]
                .into_iter()
                .collect(),
        );

        assert!(condition_matches(
            &cond(Field::OsVersion, Operator::LessThan(10.0)),
            &ctx
        ));
        assert!(!condition_matches(
            &cond(Field::OsVersion, Operator::GreaterThan(10.0)),
            &ctx
        ));
    }

    #[test]
    fn test_numeric_operators_reject_non_numeric() {
        let ctx = ctx_with_risk(0).with_device_info(
            [("os_version".to_string(), json!("latest"))]
                .into_iter()
                .collect(),
        );
        assert!(!condition_matches(
            &cond(Field::OsVersion, Operator::LessThan(10.0)),
            &ctx
        ));
        assert!(!condition_matches(
            &cond(Field::OsVersion, Operator::GreaterThan(0.0)),
            &ctx
        ));
    }

    #[test]
    fn test_absent_field_is_false_for_every_operator() {
        let ctx = ctx_with_risk(0);
        let ops = vec![
            Operator::Equals(json!("x")),
            Operator::Contains("x".to_string()),
            Operator::StartsWith("x".to_string()),
            Operator::EndsWith("x".to_string()),
            Operator::In(vec![json!("x")]),
            Operator::NotIn(vec![json!("x")]),
            Operator::GreaterThan(0.0),
            Operator::LessThan(100.0),
        ];
        for op in ops {
            assert!(
                !condition_matches(&cond(Field::UserRole, op.clone()), &ctx),
                "absent field must be false for {op:?}"
            );
        }
    }

    #[test]
    fn test_priority_short_circuit_on_deny() {
        let mut store = PolicyStore::new();
        let deny_id = store.add(
            PolicyDraft::new("quarantine", PolicyKind::Network, 1).with_action(Action::Deny),
        );
        store.add(
            PolicyDraft::new("open-door", PolicyKind::Network, 5).with_action(Action::Allow),
        );

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));

        assert!(!decision.access_granted);
        assert_eq!(decision.reason, "Policy quarantine denied access");
        assert_eq!(
            decision.applied_policies,
            vec![deny_id],
            "the lower-priority policy must never be consulted"
        );
        assert_eq!(decision.actions, vec![Action::Deny]);
    }

    #[test]
    fn test_union_of_actions_until_deny() {
        let mut store = PolicyStore::new();
        let log_id =
            store.add(PolicyDraft::new("log-all", PolicyKind::Network, 1).with_action(Action::Log));
        let mfa_id = store.add(
            PolicyDraft::new("step-up", PolicyKind::User, 2).with_action(Action::RequireMfa),
        );

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));

        assert!(decision.access_granted);
        assert_eq!(decision.actions, vec![Action::Log, Action::RequireMfa]);
        assert_eq!(decision.applied_policies, vec![log_id, mfa_id]);
        assert!(decision.mfa_required());
    }

    #[test]
    fn test_no_match_grants_with_implicit_log() {
        let mut store = PolicyStore::new();
        store.add(
            PolicyDraft::new("never-matches", PolicyKind::User, 1)
                .with_condition(cond(Field::UserRole, Operator::Equals(json!("ghost"))))
                .with_action(Action::Deny),
        );

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));

        assert!(decision.access_granted);
        assert_eq!(decision.actions, vec![Action::Log]);
        assert!(decision.applied_policies.is_empty());
        assert!(!decision.mfa_required());
    }

    #[test]
    fn test_disabled_policies_are_skipped() {
        let mut store = PolicyStore::new();
        store.add(
            PolicyDraft::new("dormant-deny", PolicyKind::Network, 1)
                .with_action(Action::Deny)
                .disabled(),
        );

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));
        assert!(decision.access_granted);
    }

    #[test]
    fn test_zero_condition_policy_always_matches() {
        let mut store = PolicyStore::new();
        let id = store
            .add(PolicyDraft::new("log-everything", PolicyKind::Network, 100)
                .with_action(Action::Log));

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(99));
        assert_eq!(decision.applied_policies, vec![id]);
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let mut store = PolicyStore::new();
        let first =
            store.add(PolicyDraft::new("first", PolicyKind::User, 10).with_action(Action::Log));
        let second = store.add(
            PolicyDraft::new("second", PolicyKind::User, 10).with_action(Action::RequireMfa),
        );

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));
        assert_eq!(decision.applied_policies, vec![first, second]);
        assert_eq!(decision.actions, vec![Action::Log, Action::RequireMfa]);
    }

    #[test]
    fn test_all_conditions_are_anded() {
        let mut store = PolicyStore::new();
        store.add(
            PolicyDraft::new("narrow", PolicyKind::User, 1)
                .with_condition(cond(Field::UserId, Operator::Equals(json!("alice"))))
                .with_condition(cond(Field::Location, Operator::Equals(json!("datacenter"))))
                .with_action(Action::Deny),
        );

        // user matches, location does not => policy must not match
        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));
        assert!(decision.access_granted);
    }

    #[test]
    fn test_mfa_required_reported_even_when_denied() {
        let mut store = PolicyStore::new();
        store.add(
            PolicyDraft::new("step-up", PolicyKind::User, 1).with_action(Action::RequireMfa),
        );
        store.add(PolicyDraft::new("deny-late", PolicyKind::User, 2).with_action(Action::Deny));

        let decision = evaluate(&store.evaluation_snapshot(), &ctx_with_risk(0));
        assert!(!decision.access_granted);
        assert!(
            decision.mfa_required(),
            "mfa requirement is independent of the grant/deny outcome"
        );
    }
}
