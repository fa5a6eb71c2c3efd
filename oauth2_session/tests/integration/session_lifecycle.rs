use oauth2_session::{
    CoordinationError, SESSION_COOKIE_NAME, get_account_core, logout_core, validate_session_core,
};

use crate::common::{MockUser, TestHarness, cookie_header};

async fn signed_in() -> (TestHarness, String, i64) {
    let harness = TestHarness::new().await;
    harness.github.add_code(
        "code",
        MockUser::new(1, "octocat", &[("octo@x.com", true, true)]),
    );
    let outcome = harness.login("code").await.unwrap();
    (harness, outcome.session_cookie.value, outcome.account.id)
}

#[tokio::test]
async fn test_protected_request_resolves_account() {
    let (harness, token, account_id) = signed_in().await;
    let headers = cookie_header(&SESSION_COOKIE_NAME, &token);

    assert_eq!(
        validate_session_core(&harness.ctx, &headers).await.unwrap(),
        account_id
    );
    let account = get_account_core(&harness.ctx, &headers).await.unwrap();
    assert_eq!(account.email, "octo@x.com");
}

#[tokio::test]
async fn test_unknown_token_is_unauthenticated() {
    let (harness, _, _) = signed_in().await;
    let headers = cookie_header(&SESSION_COOKIE_NAME, "c29tZS1vdGhlci10b2tlbg");

    assert!(matches!(
        validate_session_core(&harness.ctx, &headers).await,
        Err(CoordinationError::Unauthenticated)
    ));
    assert!(matches!(
        get_account_core(&harness.ctx, &http::HeaderMap::new()).await,
        Err(CoordinationError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_logout_revokes_and_is_idempotent() {
    // Given a signed-in browser
    let (harness, token, _) = signed_in().await;
    let headers = cookie_header(&SESSION_COOKIE_NAME, &token);

    // When it logs out twice
    let first = logout_core(&harness.ctx, &headers).await.unwrap();
    let second = logout_core(&harness.ctx, &headers).await;

    // Then both succeed, the cookie is cleared and the token is dead
    assert!(second.is_ok());
    let set_cookie = first
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=;", *SESSION_COOKIE_NAME)));
    assert!(set_cookie.contains("Max-Age=0"));
    assert!(matches!(
        validate_session_core(&harness.ctx, &headers).await,
        Err(CoordinationError::Unauthenticated)
    ));
}

#[tokio::test]
async fn test_logout_without_session() {
    let (harness, _, _) = signed_in().await;
    assert!(logout_core(&harness.ctx, &http::HeaderMap::new()).await.is_ok());
}
