use std::sync::Arc;

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    response::{IntoResponse, Response},
};
use axum_extra::{TypedHeader, headers};
use http::request::Parts;

use oauth2_session::{AuthContext, CoordinationError, SessionError};

use super::error::status_for;

/// The account behind a valid session cookie.
///
/// ```no_run
/// use oauth2_session_axum::AuthUser;
///
/// async fn whoami(user: AuthUser) -> String {
///     format!("account {}", user.account_id)
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub account_id: i64,
}

pub struct AuthRejection(CoordinationError);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (status_for(&self.0), self.0.user_message()).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AuthContext>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Installed by the middleware already
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let ctx = Arc::<AuthContext>::from_ref(state);

        let cookies: TypedHeader<headers::Cookie> = parts
            .extract()
            .await
            .map_err(|_| AuthRejection(CoordinationError::Unauthenticated))?;

        let token = cookies
            .get(ctx.sessions().cookie_name())
            .ok_or(AuthRejection(CoordinationError::Unauthenticated))?;

        match ctx.sessions().validate_token(token).await {
            Ok(account_id) => Ok(AuthUser { account_id }),
            Err(SessionError::Unauthenticated) => {
                Err(AuthRejection(CoordinationError::Unauthenticated))
            }
            Err(e) => Err(AuthRejection(
                CoordinationError::SessionStoreFailed(e.to_string()).log(),
            )),
        }
    }
}

/// `Option<AuthUser>` is `None` for anonymous requests but still fails on store errors.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    Arc<AuthContext>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <AuthUser as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(AuthRejection(CoordinationError::Unauthenticated)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
