//! Policy definitions.
//!
//! Policies consist of ordered conditions (all must match) and a list of
//! actions applied when the policy matches. Policies are evaluated in
//! ascending priority order; ties keep insertion order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zerogate_types::PolicyId;

// ============================================================================
// Policy Kind
// ============================================================================

/// Coarse category a policy belongs to. Informational only — it does not
/// influence evaluation, but is useful for admin filtering and audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Policies about the requesting user (role, login history).
    User,
    /// Policies about device posture (OS version, encryption).
    Device,
    /// Policies about the target application.
    Application,
    /// Policies about network context (location, IP).
    Network,
}

// ============================================================================
// Field
// ============================================================================

/// A logical attribute name resolved against the evaluation context.
///
/// The named variants form the fixed alias table: each maps to an explicit
/// accessor on [`crate::context::EvaluationContext`], so a typo'd alias is
/// a compile error rather than a silently-false condition. Attribute names
/// outside the table are carried as [`Field::Custom`] and resolved as a
/// literal dotted path into the context's nested signal maps; any missing
/// segment makes the condition evaluate false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The requesting user's ID.
    UserId,
    /// The requesting device's ID.
    DeviceId,
    /// The target application's ID.
    ApplicationId,
    /// The user's role (`user_info.role`).
    UserRole,
    /// The session's derived trust level (`"high"`/`"medium"`/`"low"`).
    DeviceTrustLevel,
    /// The device OS version (`device_info.os_version`).
    OsVersion,
    /// The network location label (e.g. `"office"`, `"public"`).
    Location,
    /// Alias of [`Field::Location`] kept for stored policy compatibility.
    LocationRisk,
    /// The client IP address.
    IpAddress,
    /// The client user agent string.
    UserAgent,
    /// The computed risk score (0..=100).
    RiskScore,
    /// The derived trust level, same resolution as `DeviceTrustLevel`.
    TrustLevel,
    /// A literal dotted path (e.g. `"device_info.patch_level"`).
    Custom(String),
}

// ============================================================================
// Operator
// ============================================================================

/// A comparison operator together with its operand.
///
/// Modeled as a closed sum type so every operator carries an operand of
/// the right shape and "unknown operator" is unrepresentable. Operator
/// semantics over a resolved field value:
///
/// - `Equals` — strict value equality.
/// - `Contains` / `StartsWith` / `EndsWith` — string-only; false when the
///   field value is not a string.
/// - `In` / `NotIn` — membership test against the operand list.
/// - `GreaterThan` / `LessThan` — numeric-only; a string field value that
///   parses as a number counts as numeric.
///
/// An absent field value makes every operator evaluate false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals(Value),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    GreaterThan(f64),
    LessThan(f64),
}

// ============================================================================
// Condition
// ============================================================================

/// A single attribute test within a policy.
///
/// A policy matches a context iff **all** of its conditions are true;
/// a policy with zero conditions always matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// The attribute to resolve from the context.
    pub field: Field,
    /// The comparison to apply to the resolved value.
    pub op: Operator,
}

// ============================================================================
// Action
// ============================================================================

/// An effect attached to a matching policy.
///
/// Parameters are opaque to the engine and interpreted by the action's
/// consumer (e.g. a bandwidth limit value or a redirect target).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Grant access (informational; absence of a deny already grants).
    Allow,
    /// Deny access and stop evaluation.
    Deny,
    /// Require multi-factor authentication before the session is trusted.
    RequireMfa,
    /// Throttle the session. `parameters` carries the limit value.
    LimitBandwidth { parameters: Map<String, Value> },
    /// Record the access in the audit log.
    Log,
    /// Redirect the request. `parameters` carries the target.
    Redirect { parameters: Map<String, Value> },
}

impl Action {
    /// Whether this action denies access.
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Whether this action demands multi-factor authentication.
    pub fn requires_mfa(&self) -> bool {
        matches!(self, Self::RequireMfa)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// A stored access policy.
///
/// Evaluated in ascending `priority` order; among equal priorities the
/// insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Store-assigned identity.
    pub id: PolicyId,
    /// Human-readable name, quoted in deny reasons and audit events.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Informational category.
    pub kind: PolicyKind,
    /// All conditions must match (logical AND). Empty = always matches.
    pub conditions: Vec<Condition>,
    /// Actions contributed when this policy matches.
    pub actions: Vec<Action>,
    /// Evaluation priority. Lower values are evaluated earlier.
    pub priority: i32,
    /// Disabled policies are skipped entirely.
    pub enabled: bool,
    /// Free-form labels for admin filtering.
    pub tags: Vec<String>,
}

impl Policy {
    /// Whether any of this policy's actions is a deny.
    pub fn denies(&self) -> bool {
        self.actions.iter().any(Action::is_deny)
    }
}

// ============================================================================
// Policy Draft
// ============================================================================

/// A policy without an identity, ready to be inserted into a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraft {
    pub name: String,
    pub description: String,
    pub kind: PolicyKind,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
    pub priority: i32,
    pub enabled: bool,
    pub tags: Vec<String>,
}

impl PolicyDraft {
    /// Creates an enabled draft with no conditions, actions, or tags.
    pub fn new(name: &str, kind: PolicyKind, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            kind,
            conditions: Vec::new(),
            actions: Vec::new(),
            priority,
            enabled: true,
            tags: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Appends a condition (builder pattern).
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Appends an action (builder pattern).
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Appends a tag.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.push(tag.to_string());
        self
    }

    /// Marks the draft disabled on insert.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attaches a store-assigned identity, producing a stored [`Policy`].
    pub(crate) fn into_policy(self, id: PolicyId) -> Policy {
        Policy {
            id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            conditions: self.conditions,
            actions: self.actions,
            priority: self.priority,
            enabled: self.enabled,
            tags: self.tags,
        }
    }
}

// ============================================================================
// Policy Update
// ============================================================================

/// A partial policy update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub kind: Option<PolicyKind>,
    pub conditions: Option<Vec<Condition>>,
    pub actions: Option<Vec<Action>>,
    pub priority: Option<i32>,
    pub enabled: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl PolicyUpdate {
    /// Renames the policy.
    pub fn rename(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Replaces the condition list.
    pub fn set_conditions(mut self, conditions: Vec<Condition>) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Replaces the action list.
    pub fn set_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Changes the evaluation priority.
    pub fn set_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Enables or disables the policy.
    pub fn set_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Applies this update in place.
    pub(crate) fn apply(self, policy: &mut Policy) {
        if let Some(name) = self.name {
            policy.name = name;
        }
        if let Some(description) = self.description {
            policy.description = description;
        }
        if let Some(kind) = self.kind {
            policy.kind = kind;
        }
        if let Some(conditions) = self.conditions {
            policy.conditions = conditions;
        }
        if let Some(actions) = self.actions {
            policy.actions = actions;
        }
        if let Some(priority) = self.priority {
            policy.priority = priority;
        }
        if let Some(enabled) = self.enabled {
            policy.enabled = enabled;
        }
        if let Some(tags) = self.tags {
            policy.tags = tags;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
