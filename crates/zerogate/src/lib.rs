//! # Zerogate
//!
//! Attribute-based policy evaluation and session risk scoring for
//! zero-trust access control.
//!
//! Every access request is scored from device, user, and network
//! signals, then evaluated against an ordered policy set. Grants open
//! an auditable session; denials are recorded and nothing is stored.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              SessionManager                 │
//! │  create / verify_mfa / end / stats / admin  │
//! └───────┬───────────────┬──────────────┬──────┘
//!         │               │              │
//!   ┌─────▼─────┐   ┌─────▼──────┐  ┌────▼─────┐
//!   │PolicyStore│   │SessionTable│  │ EventLog │
//!   │ (-policy) │   │            │  │ (-audit) │
//!   └───────────┘   └────────────┘  └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use zerogate::{CreateSessionRequest, EngineConfig, SessionManager};
//!
//! let manager = SessionManager::new(&EngineConfig::default());
//! let response = manager.create_session(CreateSessionRequest {
//!     user_id: "alice".to_string(),
//!     device_id: "laptop-1".to_string(),
//!     application_id: "crm".to_string(),
//!     location: "office".to_string(),
//!     ..CreateSessionRequest::default()
//! })?;
//!
//! assert!(response.access_granted);
//! # Ok::<(), zerogate::EngineError>(())
//! ```

pub mod engine;
pub mod error;
pub mod mfa;
pub mod session;

pub use engine::{CreateSessionRequest, CreateSessionResponse, EngineStats, SessionManager};
pub use error::{EngineError, Result};
pub use mfa::{MfaVerifier, StaticMfaVerifier};
pub use session::Session;

// Re-exports of the sub-crate surface callers need to build policies,
// query events, and configure the engine.
pub use zerogate_audit::{AuditEvent, EventKind, EventQuery};
pub use zerogate_config::{ConfigLoader, EngineConfig};
pub use zerogate_policy::{
    Action, Condition, EvaluationContext, Field, Operator, Policy, PolicyDecision, PolicyDraft,
    PolicyKind, PolicyUpdate,
};
pub use zerogate_types::{PolicyId, RiskScore, SessionId, TrustLevel};
