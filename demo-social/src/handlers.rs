use axum::Json;
use serde_json::{Value, json};

use oauth2_session_axum::{AUTH_LOGIN_PATH, AuthUser};

pub(crate) async fn index(user: Option<AuthUser>) -> Json<Value> {
    match user {
        Some(u) => Json(json!({ "signed_in": true, "account_id": u.account_id })),
        None => Json(json!({ "signed_in": false, "login": AUTH_LOGIN_PATH.as_str() })),
    }
}

/// Behind `is_authenticated_401`, so the extractor reads the user the middleware stored.
pub(crate) async fn me(user: AuthUser) -> Json<Value> {
    Json(json!({ "account_id": user.account_id }))
}
