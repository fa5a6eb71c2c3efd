use std::sync::LazyLock;

use crate::utils::clamp_max_age;

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("__Host-SessionId".to_string())
});

/// Session lifetime in seconds; the cookie Max-Age and the stored record share it.
pub static SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(clamp_max_age)
        .unwrap_or(86400)
});

pub(super) const SESSION_STORE_PREFIX: &str = "session";
