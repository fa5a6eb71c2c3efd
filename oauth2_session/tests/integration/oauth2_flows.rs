use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use http::header::SET_COOKIE;
use oauth2_session::{AuthResponse, CoordinationError, SESSION_COOKIE_NAME, get_authorized_core};

use crate::common::test_setup::FRONTEND_URL;
use crate::common::{MockUser, TestHarness, cookie_header};

fn octocat() -> MockUser {
    MockUser::new(
        583231,
        "octocat",
        &[("a@x.com", false, true), ("b@x.com", true, true)],
    )
}

#[tokio::test]
async fn test_login_redirect_targets_provider() {
    let harness = TestHarness::new().await;

    let redirect = oauth2_session::prepare_login_core(&harness.ctx).unwrap();

    assert!(redirect.auth_url.starts_with(&format!(
        "{}/login/oauth/authorize?",
        harness.github.base_url
    )));
    assert!(redirect.auth_url.contains("scope=user%3Aemail"));
    assert!(redirect.auth_url.contains("access_type=offline"));
    assert!(
        redirect
            .auth_url
            .contains(&format!("state={}", redirect.state_cookie.value))
    );
    let headers = redirect.headers().unwrap();
    let set_cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("oauthstate="));
    assert!(set_cookie.contains("Max-Age=3600"));
}

#[tokio::test]
async fn test_full_flow_picks_primary_verified_email() {
    // Given a GitHub user whose primary verified address is the second one listed
    let harness = TestHarness::new().await;
    harness.github.add_code("code-1", octocat());

    // When the browser completes the round trip
    let outcome = harness.login("code-1").await.unwrap();

    // Then a new account is created for the primary verified email
    assert!(outcome.created);
    assert_eq!(outcome.account.email, "b@x.com");
    assert_eq!(outcome.account.nickname.as_deref(), Some("octocat"));
    assert_eq!(outcome.account.first_name, "octocat");
    assert_eq!(outcome.redirect_to, format!("{FRONTEND_URL}/"));

    // And exactly one account row exists for it, none for the other address
    let stored = harness.ctx.accounts().find_by_email("b@x.com").await.unwrap();
    assert_eq!(stored.unwrap().id, outcome.account.id);
    assert!(harness.ctx.accounts().find_by_email("a@x.com").await.unwrap().is_none());

    // And the session cookie resolves to that account
    assert_eq!(outcome.session_cookie.name, *SESSION_COOKIE_NAME);
    let account_id = harness
        .ctx
        .sessions()
        .validate_token(&outcome.session_cookie.value)
        .await
        .unwrap();
    assert_eq!(account_id, outcome.account.id);

    // And the response sets the session and clears the state cookie
    let headers = outcome.headers().unwrap();
    let cookies: Vec<_> = headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with(&format!("{}=", *SESSION_COOKIE_NAME)));
    assert!(cookies[0].contains("HttpOnly"));
    assert!(cookies[1].starts_with("oauthstate=;"));
    assert!(cookies[1].contains("Max-Age=0"));

    // And the provider calls ran once each, in order
    assert_eq!(harness.github.token_calls(), 1);
    assert_eq!(harness.github.profile_calls(), 1);
    assert_eq!(harness.github.email_calls(), 1);
}

#[tokio::test]
async fn test_state_mismatch_is_rejected_before_exchange() {
    let harness = TestHarness::new().await;
    harness.github.add_code("code-1", octocat());
    let state = harness.start_login();

    let result = harness
        .callback("code-1", Some(&state), Some("forged-state"))
        .await;

    assert!(matches!(result, Err(CoordinationError::InvalidState(_))));
    assert_eq!(harness.github.token_calls(), 0);
    assert!(harness.ctx.accounts().find_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_state_cookie_is_rejected() {
    let harness = TestHarness::new().await;
    harness.github.add_code("code-1", octocat());
    let state = harness.start_login();

    let result = harness.callback("code-1", None, Some(&state)).await;

    assert!(matches!(result, Err(CoordinationError::InvalidState(_))));
    assert_eq!(harness.github.token_calls(), 0);
}

#[tokio::test]
async fn test_empty_state_is_rejected() {
    let harness = TestHarness::new().await;
    harness.github.add_code("code-1", octocat());

    let result = harness.callback("code-1", Some(""), Some("")).await;

    assert!(matches!(result, Err(CoordinationError::InvalidState(_))));
}

#[tokio::test]
async fn test_provider_denial() {
    let harness = TestHarness::new().await;
    let state = harness.start_login();
    let response = AuthResponse {
        state: Some(state.clone()),
        error: Some("access_denied".to_string()),
        ..Default::default()
    };

    let result = get_authorized_core(
        &harness.ctx,
        &response,
        &cookie_header("oauthstate", &state),
    )
    .await;

    assert!(matches!(result, Err(CoordinationError::AuthorizationDenied(_))));
    assert_eq!(harness.github.token_calls(), 0);
}

#[tokio::test]
async fn test_unverified_primary_fails_policy() {
    // Given a primary address that is unverified and a verified one that is not primary
    let harness = TestHarness::new().await;
    harness.github.add_code(
        "code-2",
        MockUser::new(2, "mallory", &[("p@x.com", true, false), ("v@x.com", false, true)]),
    );

    // When logging in
    let result = harness.login("code-2").await;

    // Then neither address is used and nothing is created
    assert!(matches!(result, Err(CoordinationError::NoVerifiedPrimaryEmail)));
    assert!(harness.ctx.accounts().find_by_email("p@x.com").await.unwrap().is_none());
    assert!(harness.ctx.accounts().find_by_email("v@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_bad_code_fails_exchange() {
    let harness = TestHarness::new().await;

    let result = harness.login("never-issued").await;

    assert!(matches!(result, Err(CoordinationError::ExchangeFailed(_))));
    assert_eq!(harness.github.token_calls(), 1);
    assert_eq!(harness.github.profile_calls(), 0);
}

#[tokio::test]
async fn test_slow_token_endpoint_times_out() {
    // Given a token endpoint that stalls well past the HTTP timeout
    let harness = TestHarness::with_http_timeout(Duration::from_millis(500)).await;
    harness.github.add_code("code-slow", octocat());
    harness.github.set_token_delay(Duration::from_secs(10));

    // When the callback exchanges the code
    let started = Instant::now();
    let result = harness.login("code-slow").await;

    // Then the exchange is abandoned at the timeout, not retried, and no account or session exists
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(result, Err(CoordinationError::ExchangeFailed(_))));
    assert_eq!(harness.github.token_calls(), 1);
    assert_eq!(harness.github.profile_calls(), 0);
    assert!(harness.ctx.accounts().find_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_failure() {
    let harness = TestHarness::new().await;
    let mut user = octocat();
    user.profile_status = StatusCode::BAD_GATEWAY;
    harness.github.add_code("code-3", user);

    let result = harness.login("code-3").await;

    match result {
        Err(err @ CoordinationError::ProfileFetchFailed(_)) => {
            assert!(!err.user_message().contains("upstream trouble"));
        }
        other => panic!("expected ProfileFetchFailed, got {other:?}"),
    }
    assert_eq!(harness.github.email_calls(), 0);
}

#[tokio::test]
async fn test_email_fetch_failure() {
    let harness = TestHarness::new().await;
    let mut user = octocat();
    user.emails_status = StatusCode::INTERNAL_SERVER_ERROR;
    harness.github.add_code("code-4", user);

    let result = harness.login("code-4").await;

    assert!(matches!(result, Err(CoordinationError::EmailFetchFailed(_))));
    assert!(harness.ctx.accounts().find_by_email("b@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_second_login_reuses_account() {
    // Given a user who already signed in once
    let harness = TestHarness::new().await;
    harness.github.add_code("first", octocat());
    harness.github.add_code("second", octocat());
    let first = harness.login("first").await.unwrap();

    // When they sign in again
    let second = harness.login("second").await.unwrap();

    // Then the same account is resolved and both sessions are live
    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.account.id, second.account.id);
    assert_ne!(first.session_cookie.value, second.session_cookie.value);
    for outcome in [&first, &second] {
        let id = harness
            .ctx
            .sessions()
            .validate_token(&outcome.session_cookie.value)
            .await
            .unwrap();
        assert_eq!(id, first.account.id);
    }
}

#[tokio::test]
async fn test_concurrent_callbacks_create_one_account() {
    // Given many devices completing their first login at once
    let harness = Arc::new(TestHarness::new().await);
    let n = 8;
    for i in 0..n {
        harness.github.add_code(&format!("c{i}"), octocat());
    }

    let mut handles = Vec::new();
    for i in 0..n {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            harness.login(&format!("c{i}")).await
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap().unwrap());
    }

    // Then every flow resolved the same single account
    let ids: HashSet<_> = outcomes.iter().map(|o| o.account.id).collect();
    assert_eq!(ids.len(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.created).count(), 1);

    // And every flow holds its own valid session for it
    let account_id = *ids.iter().next().unwrap();
    for outcome in &outcomes {
        let id = harness
            .ctx
            .sessions()
            .validate_token(&outcome.session_cookie.value)
            .await
            .unwrap();
        assert_eq!(id, account_id);
    }
}
