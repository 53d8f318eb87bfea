//! Session risk scoring.
//!
//! Computes a bounded risk score from heterogeneous device, user, and
//! location signals. Each contribution is independently conditioned and
//! additive — an OS version under 10.0 earns both its own penalty and
//! the under-12.0 penalty. Signals that are absent or of the wrong type
//! contribute nothing; scoring is total and never errors.

use serde_json::{Map, Value};
use zerogate_types::RiskScore;

// Device posture penalties.
const OS_LEGACY_PENALTY: u32 = 20; // os_version < 10.0
const OS_OUTDATED_PENALTY: u32 = 10; // os_version < 12.0 (independent)
const ANTIVIRUS_STALE_PENALTY: u32 = 15; // antivirus_status != "updated"
const ENCRYPTION_OFF_PENALTY: u32 = 25; // encryption_enabled != true

// User behavior penalties.
const STALE_LOGIN_PENALTY: u32 = 10; // last_login_days > 30
const FAILED_ATTEMPTS_PENALTY: u32 = 20; // failed_attempts > 3

// Network location penalties (mutually exclusive: location is one string).
const PUBLIC_LOCATION_PENALTY: u32 = 30;
const UNKNOWN_LOCATION_PENALTY: u32 = 40;

const OS_LEGACY_VERSION: f64 = 10.0;
const OS_OUTDATED_VERSION: f64 = 12.0;
const STALE_LOGIN_DAYS: f64 = 30.0;
const FAILED_ATTEMPTS_LIMIT: f64 = 3.0;

/// Computes the weighted risk score for an access request.
///
/// The sum of contributions is clamped to `[0, 100]` (contributions are
/// never negative, so only the upper bound matters).
///
/// # Examples
///
/// ```
/// use serde_json::{Map, json};
/// use zerogate_policy::risk;
///
/// let device: Map<_, _> = [
///     ("os_version".to_string(), json!("14.0")),
///     ("antivirus_status".to_string(), json!("updated")),
///     ("encryption_enabled".to_string(), json!(true)),
/// ]
/// .into_iter()
/// .collect();
/// let user: Map<_, _> = [
///     ("last_login_days".to_string(), json!(1)),
///     ("failed_attempts".to_string(), json!(0)),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(risk::score(&device, &user, "office").value(), 0);
/// ```
pub fn score(
    device_info: &Map<String, Value>,
    user_info: &Map<String, Value>,
    location: &str,
) -> RiskScore {
    let mut sum: u32 = 0;

    // Device posture. The two OS thresholds are evaluated independently:
    // a 9.x device is both legacy (<10) and outdated (<12).
    if let Some(version) = number_signal(device_info, "os_version") {
        if version < OS_LEGACY_VERSION {
            sum += OS_LEGACY_PENALTY;
        }
        if version < OS_OUTDATED_VERSION {
            sum += OS_OUTDATED_PENALTY;
        }
    }
    if let Some(status) = string_signal(device_info, "antivirus_status") {
        if status != "updated" {
            sum += ANTIVIRUS_STALE_PENALTY;
        }
    }
    if let Some(enabled) = bool_signal(device_info, "encryption_enabled") {
        if !enabled {
            sum += ENCRYPTION_OFF_PENALTY;
        }
    }

    // User behavior.
    if let Some(days) = number_signal(user_info, "last_login_days") {
        if days > STALE_LOGIN_DAYS {
            sum += STALE_LOGIN_PENALTY;
        }
    }
    if let Some(failures) = number_signal(user_info, "failed_attempts") {
        if failures > FAILED_ATTEMPTS_LIMIT {
            sum += FAILED_ATTEMPTS_PENALTY;
        }
    }

    // Network location.
    match location {
        "public" => sum += PUBLIC_LOCATION_PENALTY,
        "unknown" => sum += UNKNOWN_LOCATION_PENALTY,
        _ => {}
    }

    RiskScore::new(sum)
}

/// Numeric signal: JSON numbers directly, or strings that parse as f64
/// (version strings like `"9.0"` arrive as text). Wrong type = absent.
fn number_signal(signals: &Map<String, Value>, key: &str) -> Option<f64> {
    match signals.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn string_signal<'a>(signals: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    signals.get(key)?.as_str()
}

fn bool_signal(signals: &Map<String, Value>, key: &str) -> Option<bool> {
    signals.get(key)?.as_bool()
}

// ============================================================================
// Tests
// ============================================================================
