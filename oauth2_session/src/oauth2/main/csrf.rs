//! Anti-forgery `state` for the authorization redirect.
//!
//! Nothing is kept server-side: the state rides to the browser in a cookie and must come back
//! unchanged in the callback query.

use http::header::HeaderMap;

use crate::oauth2::config::{OAUTH2_STATE_COOKIE_MAX_AGE, OAUTH2_STATE_COOKIE_NAME};
use crate::oauth2::errors::OAuth2Error;
use crate::utils::{CookieDescriptor, constant_time_eq, gen_random_string, get_cookie};

const STATE_BYTES: usize = 32;

pub(crate) fn issue_state() -> Result<(String, CookieDescriptor), OAuth2Error> {
    let state = gen_random_string(STATE_BYTES)?;
    let cookie = CookieDescriptor::new(
        OAUTH2_STATE_COOKIE_NAME.as_str(),
        state.clone(),
        *OAUTH2_STATE_COOKIE_MAX_AGE as i64,
    );
    Ok((state, cookie))
}

/// True only when both values are present, non-empty and equal.
pub(crate) fn verify_state(cookie_value: Option<&str>, returned_value: Option<&str>) -> bool {
    match (cookie_value, returned_value) {
        (Some(cookie), Some(returned)) if !cookie.is_empty() && !returned.is_empty() => {
            constant_time_eq(cookie, returned)
        }
        _ => false,
    }
}

pub(crate) fn state_cookie_from(headers: &HeaderMap) -> Option<String> {
    get_cookie(headers, OAUTH2_STATE_COOKIE_NAME.as_str())
}

pub(crate) fn clear_state_cookie() -> CookieDescriptor {
    CookieDescriptor::expired(OAUTH2_STATE_COOKIE_NAME.as_str())
}
