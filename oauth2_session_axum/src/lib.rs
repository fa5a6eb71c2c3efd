//! Axum routes, extractor and middleware for oauth2-session.
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use oauth2_session_axum::{AUTH_ROUTE_PREFIX, auth_router, init};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Arc::new(init().await?);
//! let app: Router = Router::new().nest(AUTH_ROUTE_PREFIX.as_str(), auth_router(ctx));
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod middleware;
mod oauth2;
mod router;
mod session;

pub use config::AUTH_LOGIN_PATH;
pub use error::{IntoResponseError, status_for};
pub use middleware::is_authenticated_401;
pub use router::{auth_router, auth_router_no_trace};
pub use session::{AuthRejection, AuthUser};

pub use oauth2_session::{AUTH_ROUTE_PREFIX, AuthContext, init, spawn_session_sweeper};
