//! # zerogate-policy: Attribute-Based Policy Evaluation
//!
//! Provides the decision-making core of the Zerogate engine: ordered,
//! short-circuiting, multi-condition access policies evaluated against a
//! typed request context, plus the weighted risk scorer that feeds it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Access Request Context                      │
//! │  (identity + device/user signals + network)  │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Risk Scorer                                 │
//! │  └─ weighted signals -> score 0..=100        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Policy Evaluation Engine                    │
//! │  ├─ enabled policies, ascending priority     │
//! │  ├─ all conditions must match (AND)          │
//! │  ├─ union of matched actions                 │
//! │  └─ first deny short-circuits                │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  PolicyDecision                              │
//! │  - access granted / denied + reason          │
//! │  - accumulated actions (mfa, limits, ...)    │
//! │  - IDs of every policy that matched          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Evaluation order
//!
//! Policies are evaluated in **ascending** priority order (lower numeric
//! priority runs earlier); ties keep insertion order. This is a
//! first-deny-wins, otherwise-union-of-actions scheme — every matching
//! non-denying policy contributes its actions, up to the first deny.
//!
//! ## Examples
//!
//! ```
//! use zerogate_policy::context::EvaluationContext;
//! use zerogate_policy::model::{Action, Condition, Field, Operator, PolicyDraft, PolicyKind};
//! use zerogate_policy::store::PolicyStore;
//! use zerogate_policy::evaluator;
//!
//! let mut store = PolicyStore::new();
//! store.add(
//!     PolicyDraft::new("block-critical-risk", PolicyKind::Network, 1)
//!         .with_condition(Condition {
//!             field: Field::RiskScore,
//!             op: Operator::GreaterThan(80.0),
//!         })
//!         .with_action(Action::Deny),
//! );
//!
//! let ctx = EvaluationContext::new("alice", "laptop-1", "crm");
//! let decision = evaluator::evaluate(&store.evaluation_snapshot(), &ctx);
//! assert!(decision.access_granted);
//! ```

pub mod context;
pub mod evaluator;
pub mod model;
pub mod risk;
pub mod standard;
pub mod store;

pub use context::EvaluationContext;
pub use evaluator::{PolicyDecision, evaluate};
pub use model::{Action, Condition, Field, Operator, Policy, PolicyDraft, PolicyKind, PolicyUpdate};
pub use risk::score;
pub use store::PolicyStore;
