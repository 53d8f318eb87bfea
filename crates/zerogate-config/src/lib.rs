//! Configuration management for Zerogate
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (ZG_* prefix, `__` nesting separator,
//!    highest precedence — e.g. `ZG_AUDIT__MAX_EVENTS`)
//! 2. zerogate.local.toml (gitignored, local overrides)
//! 3. zerogate.toml (git-tracked, project config)
//! 4. ~/.config/zerogate/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Zerogate configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub project: ProjectConfig,
    pub audit: AuditConfig,
    pub policies: PoliciesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "zerogate-project".to_string(),
        }
    }
}

/// Audit event log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Retention cap: the log keeps at most this many most-recent events.
    pub max_events: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { max_events: 10_000 }
    }
}

/// Policy bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliciesConfig {
    /// Install the built-in default policy set at engine construction.
    pub install_defaults: bool,
}

impl Default for PoliciesConfig {
    fn default() -> Self {
        Self {
            install_defaults: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
