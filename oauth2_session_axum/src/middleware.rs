use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use oauth2_session::{AuthContext, validate_session_core};

use super::error::status_for;
use super::session::AuthUser;

/// Authentication checker with 401 response.
///
/// Use with `axum::middleware::from_fn_with_state`. On success the [`AuthUser`] is placed in the
/// request extensions.
pub async fn is_authenticated_401(
    State(ctx): State<Arc<AuthContext>>,
    mut req: Request,
    next: Next,
) -> Response {
    match validate_session_core(&ctx, req.headers()).await {
        Ok(account_id) => {
            req.extensions_mut().insert(AuthUser { account_id });
            next.run(req).await
        }
        Err(err) => (status_for(&err), err.user_message()).into_response(),
    }
}
