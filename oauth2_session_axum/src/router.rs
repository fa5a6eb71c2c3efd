//! Router for the authentication endpoints

use std::sync::Arc;

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use oauth2_session::AuthContext;

/// Router for all authentication endpoints, to be nested under `AUTH_ROUTE_PREFIX`:
/// - `GET  {prefix}/oauth/login`
/// - `GET  {prefix}/oauth/callback`
/// - `POST {prefix}/logout`
/// - `GET  {prefix}/me`
pub fn auth_router(ctx: Arc<AuthContext>) -> Router {
    auth_router_no_trace(ctx).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`auth_router`] without the HTTP tracing layer.
pub fn auth_router_no_trace(ctx: Arc<AuthContext>) -> Router {
    super::oauth2::router().with_state(ctx)
}
