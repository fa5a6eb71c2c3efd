mod context;
mod errors;
mod identity;
mod oauth2;

pub use context::{AuthContext, InitError};
pub use errors::CoordinationError;
pub use identity::IdentityResolver;
pub use oauth2::{
    AuthorizedOutcome, LoginRedirect, get_account_core, get_authorized_core, logout_core,
    prepare_login_core, validate_session_core,
};
