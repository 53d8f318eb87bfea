//! Multi-factor authentication seam.
//!
//! Token verification is an outbound dependency of the engine: the
//! session manager decides *when* MFA is checked, a [`MfaVerifier`]
//! decides *whether* a token is valid.

use zerogate_types::SessionId;

/// Verifies an MFA token for a session.
///
/// Implementations are injected into the engine at construction time.
pub trait MfaVerifier: Send + Sync {
    /// Returns whether the token is valid for the session.
    fn verify(&self, session_id: SessionId, token: &str) -> bool;
}

/// Reference verifier that accepts every token.
///
/// Production deployments must replace this with a delegate to a real
/// MFA provider; the engine itself performs no cryptographic checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticMfaVerifier;

impl MfaVerifier for StaticMfaVerifier {
    fn verify(&self, _session_id: SessionId, _token: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_verifier_accepts_everything() {
        let verifier = StaticMfaVerifier;
        assert!(verifier.verify(SessionId::generate(), ""));
        assert!(verifier.verify(SessionId::generate(), "000000"));
    }
}
