use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};

use oauth2_session::{
    Account, AuthContext, AuthResponse, CoordinationError, get_account_core, get_authorized_core,
    logout_core, prepare_login_core,
};

use super::config::AUTH_LOGIN_PATH;
use super::error::{IntoResponseError, status_for};

pub(super) fn router() -> Router<Arc<AuthContext>> {
    Router::new()
        .route("/oauth/login", get(github_login))
        .route("/oauth/callback", get(github_callback))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Template)]
#[template(path = "login_error.j2")]
struct LoginErrorTemplate<'a> {
    message: &'a str,
    login_url: &'a str,
}

async fn github_login(
    State(ctx): State<Arc<AuthContext>>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let login = prepare_login_core(&ctx).into_response_error()?;
    let headers = login.headers().into_response_error()?;
    Ok((headers, Redirect::temporary(&login.auth_url)))
}

async fn github_callback(
    State(ctx): State<Arc<AuthContext>>,
    Query(auth_response): Query<AuthResponse>,
    headers: HeaderMap,
) -> Response {
    let outcome = match get_authorized_core(&ctx, &auth_response, &headers).await {
        Ok(outcome) => outcome,
        Err(err) => return login_error_page(&err),
    };

    let mut response_headers = match outcome.headers() {
        Ok(h) => h,
        Err(err) => return login_error_page(&err.log()),
    };
    match outcome.redirect_to.parse::<HeaderValue>() {
        Ok(location) => {
            response_headers.insert(LOCATION, location);
        }
        Err(_) => {
            let err = CoordinationError::SessionCreateFailed(format!(
                "Unusable redirect target: {}",
                outcome.redirect_to
            ))
            .log();
            return login_error_page(&err);
        }
    }

    tracing::info!(
        account_id = outcome.account.id,
        created = outcome.created,
        "GitHub login complete"
    );
    (StatusCode::FOUND, response_headers).into_response()
}

/// Error page for a failed callback. Never sets a cookie.
fn login_error_page(err: &CoordinationError) -> Response {
    let template = LoginErrorTemplate {
        message: err.user_message(),
        login_url: AUTH_LOGIN_PATH.as_str(),
    };
    match template.render() {
        Ok(html) => (status_for(err), Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render login error page: {}", e);
            (status_for(err), err.user_message()).into_response()
        }
    }
}

async fn logout(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Result<(HeaderMap, StatusCode), (StatusCode, String)> {
    let headers = logout_core(&ctx, &headers).await.into_response_error()?;
    Ok((headers, StatusCode::OK))
}

async fn me(
    State(ctx): State<Arc<AuthContext>>,
    headers: HeaderMap,
) -> Result<Json<Account>, (StatusCode, String)> {
    get_account_core(&ctx, &headers)
        .await
        .map(Json)
        .into_response_error()
}
