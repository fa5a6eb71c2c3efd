use http::StatusCode;
use oauth2_session::CoordinationError;

/// HTTP status for each way an auth flow can fail.
pub fn status_for(err: &CoordinationError) -> StatusCode {
    match err {
        CoordinationError::InvalidState(_)
        | CoordinationError::AuthorizationDenied(_)
        | CoordinationError::NoVerifiedPrimaryEmail => StatusCode::BAD_REQUEST,
        CoordinationError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CoordinationError::StateIssueFailed(_)
        | CoordinationError::ExchangeFailed(_)
        | CoordinationError::ProfileFetchFailed(_)
        | CoordinationError::EmailFetchFailed(_)
        | CoordinationError::AccountLookupFailed(_)
        | CoordinationError::AccountCreateFailed(_)
        | CoordinationError::SessionCreateFailed(_)
        | CoordinationError::SessionStoreFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Detail stays in the server log; the client gets the generic message.
impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (status_for(&e), e.user_message().to_string()))
    }
}
