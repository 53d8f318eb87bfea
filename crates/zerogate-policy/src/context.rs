//! The typed request context policies are evaluated against.
//!
//! The context merges request identity, network attributes, free-form
//! device/user signal maps, and the computed risk assessment. Field
//! aliases resolve through explicit accessors; only [`Field::Custom`]
//! paths traverse the nested signal maps, and anything absent resolves to
//! `None` (which makes every operator evaluate false).

use serde_json::{Map, Value};
use zerogate_types::{RiskScore, TrustLevel};

use crate::model::Field;

/// Attributes of a single access request, ready for policy evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    /// The requesting user's ID.
    pub user_id: String,
    /// The requesting device's ID.
    pub device_id: String,
    /// The target application's ID.
    pub application_id: String,
    /// Client IP address.
    pub ip_address: String,
    /// Client user agent string.
    pub user_agent: String,
    /// Network location label (e.g. `"office"`, `"public"`, `"unknown"`).
    pub location: String,
    /// Computed risk score for this request.
    pub risk_score: RiskScore,
    /// Trust level derived from the risk score.
    pub trust_level: TrustLevel,
    /// Free-form device posture signals (e.g. `os_version`,
    /// `antivirus_status`, `encryption_enabled`).
    pub device_info: Map<String, Value>,
    /// Free-form user behavior signals (e.g. `role`, `last_login_days`,
    /// `failed_attempts`).
    pub user_info: Map<String, Value>,
}

impl EvaluationContext {
    /// Creates a context with empty network attributes and signals, zero
    /// risk, and the trust level that follows from it.
    pub fn new(user_id: &str, device_id: &str, application_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            device_id: device_id.to_string(),
            application_id: application_id.to_string(),
            ip_address: String::new(),
            user_agent: String::new(),
            location: String::new(),
            risk_score: RiskScore::ZERO,
            trust_level: TrustLevel::from_score(RiskScore::ZERO),
            device_info: Map::new(),
            user_info: Map::new(),
        }
    }

    /// Sets the network attributes.
    pub fn with_network(mut self, ip_address: &str, user_agent: &str, location: &str) -> Self {
        self.ip_address = ip_address.to_string();
        self.user_agent = user_agent.to_string();
        self.location = location.to_string();
        self
    }

    /// Sets the risk assessment (score plus derived trust level).
    pub fn with_risk(mut self, score: RiskScore) -> Self {
        self.risk_score = score;
        self.trust_level = TrustLevel::from_score(score);
        self
    }

    /// Attaches device posture signals.
    pub fn with_device_info(mut self, device_info: Map<String, Value>) -> Self {
        self.device_info = device_info;
        self
    }

    /// Attaches user behavior signals.
    pub fn with_user_info(mut self, user_info: Map<String, Value>) -> Self {
        self.user_info = user_info;
        self
    }

    // ------------------------------------------------------------------
    // Alias accessors
    // ------------------------------------------------------------------

    /// The user's role from the user signals, if present.
    pub fn user_role(&self) -> Option<&Value> {
        self.user_info.get("role")
    }

    /// The device OS version from the device signals, if present.
    pub fn os_version(&self) -> Option<&Value> {
        self.device_info.get("os_version")
    }

    /// Resolves a policy field to its value in this context.
    ///
    /// Returns `None` when the attribute is absent, which makes every
    /// operator evaluate false — resolution is total and never errors.
    pub fn resolve(&self, field: &Field) -> Option<Value> {
        match field {
            Field::UserId => Some(Value::String(self.user_id.clone())),
            Field::DeviceId => Some(Value::String(self.device_id.clone())),
            Field::ApplicationId => Some(Value::String(self.application_id.clone())),
            Field::UserRole => self.user_role().cloned(),
            Field::DeviceTrustLevel | Field::TrustLevel => {
                Some(Value::String(self.trust_level.as_str().to_string()))
            }
            Field::OsVersion => self.os_version().cloned(),
            Field::Location | Field::LocationRisk => Some(Value::String(self.location.clone())),
            Field::IpAddress => Some(Value::String(self.ip_address.clone())),
            Field::UserAgent => Some(Value::String(self.user_agent.clone())),
            Field::RiskScore => Some(Value::from(u32::from(self.risk_score.value()))),
            Field::Custom(path) => self.resolve_path(path),
        }
    }

    /// Resolves a literal dotted path against the context.
    ///
    /// The first segment selects the root (`user_info`, `device_info`, or
    /// a scalar field name); remaining segments traverse nested objects.
    /// Any missing segment or non-object intermediate yields `None`.
    fn resolve_path(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;

        let root: &Map<String, Value> = match head {
            "user_info" => &self.user_info,
            "device_info" => &self.device_info,
            // Bare scalar names resolve only as a single-segment path.
            other => {
                if segments.next().is_some() {
                    return None;
                }
                return match other {
                    "user_id" => Some(Value::String(self.user_id.clone())),
                    "device_id" => Some(Value::String(self.device_id.clone())),
                    "application_id" => Some(Value::String(self.application_id.clone())),
                    "ip_address" => Some(Value::String(self.ip_address.clone())),
                    "user_agent" => Some(Value::String(self.user_agent.clone())),
                    "location" => Some(Value::String(self.location.clone())),
                    _ => None,
                };
            }
        };

        let mut current: Option<&Value> = None;
        for segment in segments {
            current = match current {
                None => root.get(segment),
                Some(value) => value.as_object()?.get(segment),
            };
            current?;
        }
        // A bare "user_info" / "device_info" path names an object, not a
        // comparable attribute value.
        current.cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signals(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn sample_context() -> EvaluationContext {
        EvaluationContext::new("alice", "laptop-1", "crm")
            .with_network("203.0.113.9", "Mozilla/5.0", "office")
            .with_risk(RiskScore::new(35))
            .with_device_info(signals(&[
                ("os_version", json!("14.0")),
                ("posture", json!({ "patch_level": "2024.2" })),
            ]))
            .with_user_info(signals(&[("role", json!("admin"))]))
    }

    #[test]
    fn test_alias_resolution() {
        let ctx = sample_context();

        assert_eq!(ctx.resolve(&Field::UserId), Some(json!("alice")));
        assert_eq!(ctx.resolve(&Field::UserRole), Some(json!("admin")));
        assert_eq!(ctx.resolve(&Field::OsVersion), Some(json!("14.0")));
        assert_eq!(ctx.resolve(&Field::Location), Some(json!("office")));
        assert_eq!(ctx.resolve(&Field::LocationRisk), Some(json!("office")));
        assert_eq!(ctx.resolve(&Field::RiskScore), Some(json!(35)));
        assert_eq!(ctx.resolve(&Field::TrustLevel), Some(json!("medium")));
        assert_eq!(ctx.resolve(&Field::DeviceTrustLevel), Some(json!("medium")));
    }

    #[test]
    fn test_custom_path_nested_traversal() {
        let ctx = sample_context();

        assert_eq!(
            ctx.resolve(&Field::Custom("device_info.posture.patch_level".to_string())),
            Some(json!("2024.2"))
        );
        assert_eq!(
            ctx.resolve(&Field::Custom("user_info.role".to_string())),
            Some(json!("admin"))
        );
        assert_eq!(
            ctx.resolve(&Field::Custom("location".to_string())),
            Some(json!("office"))
        );
    }

    #[test]
    fn test_custom_path_missing_segment_is_absent() {
        let ctx = sample_context();

        assert_eq!(
            ctx.resolve(&Field::Custom("device_info.nonexistent".to_string())),
            None
        );
        assert_eq!(
            ctx.resolve(&Field::Custom("user_info.role.nested".to_string())),
            None,
            "traversing through a non-object must yield absent, not an error"
        );
        assert_eq!(ctx.resolve(&Field::Custom("bogus_root".to_string())), None);
        assert_eq!(
            ctx.resolve(&Field::Custom("device_info".to_string())),
            None,
            "a bare map root is not a comparable value"
        );
    }

    #[test]
    fn test_absent_role_resolves_none() {
        let ctx = EvaluationContext::new("bob", "d", "app");
        assert_eq!(ctx.resolve(&Field::UserRole), None);
        assert_eq!(ctx.resolve(&Field::OsVersion), None);
    }

    #[test]
    fn test_with_risk_derives_trust_level() {
        let ctx = EvaluationContext::new("a", "b", "c").with_risk(RiskScore::new(80));
        assert_eq!(ctx.trust_level, TrustLevel::Low);
    }
}
