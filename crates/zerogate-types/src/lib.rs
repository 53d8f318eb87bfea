//! # zerogate-types: Core types for Zerogate
//!
//! This crate contains shared types used across the Zerogate engine:
//! - Entity IDs ([`SessionId`], [`PolicyId`])
//! - Risk assessment types ([`RiskScore`], [`TrustLevel`])

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Entity IDs
// ============================================================================

/// Unique identifier for an access session.
///
/// Generated by the engine (UUID v4), globally unique per process. A
/// session ID is minted for every access request, including denied ones;
/// only granted requests produce a stored session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mints a fresh random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID (for deserialized or test data).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SessionId> for Uuid {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

/// Unique identifier for a policy within a policy store.
///
/// Assigned monotonically by the store on insert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PolicyId(u64);

impl PolicyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PolicyId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<PolicyId> for u64 {
    fn from(id: PolicyId) -> Self {
        id.0
    }
}

// ============================================================================
// Risk Score
// ============================================================================

/// A bounded session risk score in the closed interval `[0, 100]`.
///
/// Construction clamps at the upper bound, so the invariant holds by
/// type: there is no way to observe a score above 100.
///
/// # Examples
///
/// ```
/// use zerogate_types::RiskScore;
///
/// assert_eq!(RiskScore::new(130).value(), 100);
/// assert_eq!(RiskScore::new(35).value(), 35);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Maximum representable risk.
    pub const MAX: RiskScore = RiskScore(100);

    /// Zero risk.
    pub const ZERO: RiskScore = RiskScore(0);

    /// Creates a score from an unclamped sum of risk contributions.
    ///
    /// Sums above 100 saturate at 100 (contributions are never negative,
    /// so no lower clamp is needed).
    pub fn new(raw: u32) -> Self {
        Self(raw.min(100) as u8)
    }

    /// Returns the numeric score (0..=100).
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Trust Level
// ============================================================================

/// Coarse trust bucket derived from a [`RiskScore`].
///
/// Bucket boundaries are closed on the low side:
/// score <= 20 is `High`, score <= 50 is `Medium`, everything above is `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Low risk (score 0..=20): trusted posture.
    High,
    /// Moderate risk (score 21..=50): elevated scrutiny.
    Medium,
    /// High risk (score 51..=100): untrusted posture.
    Low,
}

impl TrustLevel {
    /// Buckets a risk score into a trust level.
    ///
    /// # Examples
    ///
    /// ```
    /// use zerogate_types::{RiskScore, TrustLevel};
    ///
    /// assert_eq!(TrustLevel::from_score(RiskScore::new(20)), TrustLevel::High);
    /// assert_eq!(TrustLevel::from_score(RiskScore::new(21)), TrustLevel::Medium);
    /// assert_eq!(TrustLevel::from_score(RiskScore::new(51)), TrustLevel::Low);
    /// ```
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            0..=20 => Self::High,
            21..=50 => Self::Medium,
            _ => Self::Low,
        }
    }

    /// Returns the canonical lowercase name ("high", "medium", "low").
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
