use std::sync::LazyLock;

use oauth2_session::AUTH_ROUTE_PREFIX;

/// Where a failed callback page sends the user to try again.
pub static AUTH_LOGIN_PATH: LazyLock<String> =
    LazyLock::new(|| format!("{}/oauth/login", AUTH_ROUTE_PREFIX.as_str()));
