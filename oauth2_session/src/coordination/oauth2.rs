//! Login, callback, session check and logout flows.
//!
//! The callback is a fixed sequence of steps. Each step consumes the value the previous one
//! produced and either yields the next one or a [`CoordinationError`] naming where it stopped:
//!
//! `CallbackReceived -> StateVerified -> TokenExchanged -> ProfileFetched -> EmailResolved
//!  -> AccountResolved -> SessionIssued`

use http::header::HeaderMap;

use crate::oauth2::{
    AccessToken, AuthResponse, FederatedProfile, VerifiedIdentity, clear_state_cookie,
    issue_state, select_primary_verified_email, state_cookie_from, verify_state,
};
use crate::userdb::Account;
use crate::utils::{CookieDescriptor, header_set_cookie};
use crate::AuthContext;

use super::errors::{CoordinationError, from_provider};
use super::identity::with_timeout;

/// Where to send the browser to start a GitHub login, and the state cookie to set alongside.
#[derive(Debug, Clone)]
pub struct LoginRedirect {
    pub auth_url: String,
    pub state_cookie: CookieDescriptor,
}

impl LoginRedirect {
    pub fn headers(&self) -> Result<HeaderMap, CoordinationError> {
        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.state_cookie)
            .map_err(|e| CoordinationError::StateIssueFailed(e.to_string()))?;
        Ok(headers)
    }
}

/// A completed login.
#[derive(Debug, Clone)]
pub struct AuthorizedOutcome {
    pub account: Account,
    /// True when this login created the account.
    pub created: bool,
    pub session_cookie: CookieDescriptor,
    pub clear_state_cookie: CookieDescriptor,
    pub redirect_to: String,
}

impl AuthorizedOutcome {
    /// `Set-Cookie` headers for the session and for dropping the state cookie.
    pub fn headers(&self) -> Result<HeaderMap, CoordinationError> {
        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.session_cookie)
            .map_err(|e| CoordinationError::SessionCreateFailed(e.to_string()))?;
        header_set_cookie(&mut headers, &self.clear_state_cookie)
            .map_err(|e| CoordinationError::SessionCreateFailed(e.to_string()))?;
        Ok(headers)
    }
}

/// Mint a state and build the GitHub authorization URL carrying it.
pub fn prepare_login_core(ctx: &AuthContext) -> Result<LoginRedirect, CoordinationError> {
    let (state, state_cookie) =
        issue_state().map_err(|e| CoordinationError::StateIssueFailed(e.to_string()).log())?;
    let auth_url = ctx
        .github
        .authorization_url(&state)
        .map_err(|e| from_provider(e).log())?;

    tracing::debug!("Redirecting to GitHub for authorization");
    Ok(LoginRedirect {
        auth_url,
        state_cookie,
    })
}

/// Complete a GitHub callback: verify state, talk to GitHub, resolve the account, open a session.
///
/// Any error leaves the browser without a session.
#[tracing::instrument(skip_all)]
pub async fn get_authorized_core(
    ctx: &AuthContext,
    auth_response: &AuthResponse,
    headers: &HeaderMap,
) -> Result<AuthorizedOutcome, CoordinationError> {
    let received = CallbackReceived {
        response: auth_response,
        state_cookie: state_cookie_from(headers),
    };

    run_callback(ctx, received)
        .await
        .map_err(CoordinationError::log)
}

async fn run_callback(
    ctx: &AuthContext,
    received: CallbackReceived<'_>,
) -> Result<AuthorizedOutcome, CoordinationError> {
    let verified = verify_callback_state(received)?;
    let exchanged = exchange_code(ctx, verified).await?;
    let fetched = fetch_profile(ctx, exchanged).await?;
    let resolved = resolve_email(fetched)?;
    let account = resolve_account(ctx, resolved).await?;
    let issued = issue_session(ctx, account).await?;

    Ok(AuthorizedOutcome {
        account: issued.account,
        created: issued.created,
        session_cookie: issued.cookie,
        clear_state_cookie: clear_state_cookie(),
        redirect_to: format!("{}/", ctx.config.frontend_url),
    })
}

pub(super) struct CallbackReceived<'a> {
    response: &'a AuthResponse,
    state_cookie: Option<String>,
}

#[derive(Debug)]
pub(super) struct StateVerified {
    code: String,
}

pub(super) struct TokenExchanged {
    token: AccessToken,
}

pub(super) struct ProfileFetched {
    profile: FederatedProfile,
}

pub(super) struct EmailResolved {
    identity: VerifiedIdentity,
}

pub(super) struct AccountResolved {
    account: Account,
    created: bool,
}

pub(super) struct SessionIssued {
    account: Account,
    created: bool,
    cookie: CookieDescriptor,
}

pub(super) fn verify_callback_state(
    received: CallbackReceived<'_>,
) -> Result<StateVerified, CoordinationError> {
    let response = received.response;

    if !verify_state(received.state_cookie.as_deref(), response.state.as_deref()) {
        let reason = match (&received.state_cookie, &response.state) {
            (None, _) => "state cookie missing",
            (_, None) => "state parameter missing",
            _ => "state mismatch",
        };
        return Err(CoordinationError::InvalidState(reason.to_string()));
    }

    if let Some(error) = &response.error {
        let description = response.error_description.as_deref().unwrap_or_default();
        return Err(CoordinationError::AuthorizationDenied(format!(
            "{error}: {description}"
        )));
    }

    match &response.code {
        Some(code) if !code.is_empty() => Ok(StateVerified { code: code.clone() }),
        _ => Err(CoordinationError::ExchangeFailed(
            "Callback carried no authorization code".to_string(),
        )),
    }
}

async fn exchange_code(
    ctx: &AuthContext,
    verified: StateVerified,
) -> Result<TokenExchanged, CoordinationError> {
    let token = ctx
        .github
        .exchange_code(&verified.code)
        .await
        .map_err(from_provider)?;
    Ok(TokenExchanged { token })
}

async fn fetch_profile(
    ctx: &AuthContext,
    exchanged: TokenExchanged,
) -> Result<ProfileFetched, CoordinationError> {
    let user = ctx
        .github
        .fetch_profile(&exchanged.token)
        .await
        .map_err(from_provider)?;
    let emails = ctx
        .github
        .fetch_verified_emails(&exchanged.token)
        .await
        .map_err(from_provider)?;
    Ok(ProfileFetched {
        profile: FederatedProfile::new(user, emails),
    })
}

pub(super) fn resolve_email(fetched: ProfileFetched) -> Result<EmailResolved, CoordinationError> {
    let profile = fetched.profile;
    let email = select_primary_verified_email(&profile.emails)
        .map_err(from_provider)?
        .email
        .clone();
    Ok(EmailResolved {
        identity: VerifiedIdentity {
            email,
            login: profile.login,
            name: profile.name,
        },
    })
}

async fn resolve_account(
    ctx: &AuthContext,
    resolved: EmailResolved,
) -> Result<AccountResolved, CoordinationError> {
    let (account, created) = ctx.identities.find_or_create(&resolved.identity).await?;
    Ok(AccountResolved { account, created })
}

async fn issue_session(
    ctx: &AuthContext,
    resolved: AccountResolved,
) -> Result<SessionIssued, CoordinationError> {
    let (token, cookie) = ctx
        .sessions
        .issue(resolved.account.id)
        .await
        .map_err(|e| CoordinationError::SessionCreateFailed(e.to_string()))?;

    if let Err(e) = cookie.to_header() {
        // Do not leave a live session nobody can present
        if let Err(cleanup) = ctx.sessions.invalidate_token(&token).await {
            tracing::error!("Failed to revoke unusable session: {}", cleanup);
        }
        return Err(CoordinationError::SessionCreateFailed(e.to_string()));
    }

    Ok(SessionIssued {
        account: resolved.account,
        created: resolved.created,
        cookie,
    })
}

/// The account id behind the request's session cookie.
pub async fn validate_session_core(
    ctx: &AuthContext,
    headers: &HeaderMap,
) -> Result<i64, CoordinationError> {
    ctx.sessions
        .validate(headers)
        .await
        .map_err(|e| CoordinationError::from(e).log())
}

/// The full account behind the request's session cookie.
pub async fn get_account_core(
    ctx: &AuthContext,
    headers: &HeaderMap,
) -> Result<Account, CoordinationError> {
    let account_id = validate_session_core(ctx, headers).await?;

    let account = with_timeout(
        ctx.config.storage_timeout,
        ctx.accounts.get_account(account_id),
    )
    .await
    .map_err(|e| CoordinationError::AccountLookupFailed(e.to_string()).log())?;

    account.ok_or_else(|| {
        tracing::warn!(account_id, "Session refers to a missing account");
        CoordinationError::Unauthenticated
    })
}

/// Revoke the request's session and return headers that clear the cookie. Safe to repeat.
pub async fn logout_core(
    ctx: &AuthContext,
    headers: &HeaderMap,
) -> Result<HeaderMap, CoordinationError> {
    let clear = ctx
        .sessions
        .invalidate(headers)
        .await
        .map_err(|e| CoordinationError::SessionStoreFailed(e.to_string()).log())?;

    let mut response_headers = HeaderMap::new();
    header_set_cookie(&mut response_headers, &clear)
        .map_err(|e| CoordinationError::SessionStoreFailed(e.to_string()).log())?;
    Ok(response_headers)
}
