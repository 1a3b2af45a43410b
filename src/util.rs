//! Shared utility functions for the keymint application.

use axum::http::HeaderMap;

pub const SECONDS_PER_DAY: i64 = 86400;

/// Compute an expiry timestamp from a day count. None = perpetual.
///
/// `base_time` is typically `Utc::now().timestamp()` at issuance.
pub fn expires_from_days(days: Option<i32>, base_time: i64) -> Option<i64> {
    days.map(|d| base_time + (d as i64) * SECONDS_PER_DAY)
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
