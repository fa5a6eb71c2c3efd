use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Days, Months, NaiveDate};
use headers::HeaderMapExt;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use ring::rand::SecureRandom;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub(crate) fn gen_random_bytes(len: usize) -> Result<Vec<u8>, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random bytes".to_string()))?;
    Ok(bytes)
}

/// Draws `len` bytes from the system CSPRNG and returns them base64url encoded without padding.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let bytes = gen_random_bytes(len)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Picks a date uniformly between 80 and 18 years before `today`.
pub(crate) fn random_date_of_birth(today: NaiveDate) -> Result<NaiveDate, UtilError> {
    let latest = today
        .checked_sub_months(Months::new(12 * 18))
        .ok_or_else(|| UtilError::Format("Date out of range".to_string()))?;
    let earliest = today
        .checked_sub_months(Months::new(12 * 80))
        .ok_or_else(|| UtilError::Format("Date out of range".to_string()))?;

    let span = (latest - earliest).num_days().max(0) as u64;

    let mut buf = [0u8; 8];
    buf.copy_from_slice(&gen_random_bytes(8)?);
    let offset = u64::from_le_bytes(buf) % (span + 1);

    earliest
        .checked_add_days(Days::new(offset))
        .ok_or_else(|| UtilError::Format("Date out of range".to_string()))
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Browsers cap `Max-Age` at 400 days; longer lifetimes are cut down to it.
pub(crate) const MAX_COOKIE_MAX_AGE: u64 = 400 * 24 * 60 * 60;

pub(crate) fn clamp_max_age(secs: u64) -> u64 {
    secs.min(MAX_COOKIE_MAX_AGE)
}

/// A `Set-Cookie` value that the caller attaches to its response.
///
/// Every cookie issued by this crate is `HttpOnly`, `Secure`, `SameSite=Lax` and scoped to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieDescriptor {
    pub name: String,
    pub value: String,
    pub max_age: i64,
}

impl CookieDescriptor {
    pub fn new(name: impl Into<String>, value: impl Into<String>, max_age: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age,
        }
    }

    /// A descriptor that makes the browser drop the named cookie.
    pub fn expired(name: impl Into<String>) -> Self {
        Self::new(name, "", 0)
    }

    pub fn header_value(&self) -> String {
        format!(
            "{}={}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={}",
            self.name, self.value, self.max_age
        )
    }

    pub fn to_header(&self) -> Result<HeaderValue, UtilError> {
        self.header_value()
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))
    }
}

pub(crate) fn header_set_cookie<'a>(
    headers: &'a mut HeaderMap,
    cookie: &CookieDescriptor,
) -> Result<&'a HeaderMap, UtilError> {
    headers.append(SET_COOKIE, cookie.to_header()?);
    Ok(headers)
}

/// Reads a single cookie value out of the request's `Cookie` header(s).
pub(crate) fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.typed_get::<headers::Cookie>()?;
    cookies.get(name).map(str::to_string)
}

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Invalid format: {0}")]
    Format(String),
}
