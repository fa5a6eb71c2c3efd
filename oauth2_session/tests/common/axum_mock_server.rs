//! An in-process stand-in for GitHub's OAuth and REST endpoints.
//!
//! Each test starts its own server on an ephemeral port. Authorization codes map to canned
//! users; the access token handed out for code `c` is `tok-c`.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::{
    collections::HashMap,
    time::Duration,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Clone, Debug)]
pub struct MockUser {
    pub id: i64,
    pub login: String,
    /// `(email, primary, verified)`
    pub emails: Vec<(String, bool, bool)>,
    pub profile_status: StatusCode,
    pub emails_status: StatusCode,
}

impl MockUser {
    pub fn new(id: i64, login: &str, emails: &[(&str, bool, bool)]) -> Self {
        Self {
            id,
            login: login.to_string(),
            emails: emails
                .iter()
                .map(|(e, p, v)| (e.to_string(), *p, *v))
                .collect(),
            profile_status: StatusCode::OK,
            emails_status: StatusCode::OK,
        }
    }
}

#[derive(Default)]
struct MockState {
    users: Mutex<HashMap<String, MockUser>>,
    token_delay: Mutex<Duration>,
    token_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    email_calls: AtomicUsize,
}

#[derive(Clone)]
pub struct MockGithub {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockGithub {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/login/oauth/access_token", post(token))
            .route("/user", get(user))
            .route("/user/emails", get(emails))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Make `code` redeemable for `user`.
    pub fn add_code(&self, code: &str, user: MockUser) {
        self.state
            .users
            .lock()
            .unwrap()
            .insert(code.to_string(), user);
    }

    /// Hold every token response for `delay`.
    pub fn set_token_delay(&self, delay: Duration) {
        *self.state.token_delay.lock().unwrap() = delay;
    }

    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.state.profile_calls.load(Ordering::SeqCst)
    }

    pub fn email_calls(&self) -> usize {
        self.state.email_calls.load(Ordering::SeqCst)
    }
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *state.token_delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let code = form.get("code").cloned().unwrap_or_default();
    let known = state.users.lock().unwrap().contains_key(&code);
    let client_ok = form.get("client_id").map(String::as_str) == Some("test-client-id")
        && form.get("client_secret").map(String::as_str) == Some("test-client-secret");

    if !known || !client_ok {
        // GitHub reports a bad code with 200 and an error body
        return Json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired."
        }))
        .into_response();
    }

    Json(json!({
        "access_token": format!("tok-{code}"),
        "token_type": "bearer",
        "scope": "user:email"
    }))
    .into_response()
}

fn user_for(state: &MockState, headers: &HeaderMap) -> Option<MockUser> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let code = auth.strip_prefix("Bearer tok-")?;
    state.users.lock().unwrap().get(code).cloned()
}

async fn user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);

    let Some(user) = user_for(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response();
    };
    if user.profile_status != StatusCode::OK {
        return (user.profile_status, "upstream trouble").into_response();
    }

    Json(json!({
        "id": user.id,
        "login": user.login,
        "name": null,
        "email": null
    }))
    .into_response()
}

async fn emails(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.email_calls.fetch_add(1, Ordering::SeqCst);

    let Some(user) = user_for(&state, &headers) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Bad credentials"})))
            .into_response();
    };
    if user.emails_status != StatusCode::OK {
        return (user.emails_status, "upstream trouble").into_response();
    }

    let body: Vec<_> = user
        .emails
        .iter()
        .map(|(email, primary, verified)| {
            json!({
                "email": email,
                "primary": primary,
                "verified": verified,
                "visibility": if *primary { Some("private") } else { None }
            })
        })
        .collect();
    Json(body).into_response()
}
