use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use oauth2_session_axum::{
    AUTH_ROUTE_PREFIX, auth_router, init, is_authenticated_401, spawn_session_sweeper,
};

mod handlers;
mod server;

use crate::{
    handlers::{index, me},
    server::spawn_http_server,
};

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,oauth2_session=debug,oauth2_session_axum=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let ctx = match init().await {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let _sweeper = spawn_session_sweeper(ctx.sessions().clone(), SESSION_SWEEP_PERIOD);

    let app = Router::new()
        .route(
            "/api/me",
            get(me).route_layer(from_fn_with_state(ctx.clone(), is_authenticated_401)),
        )
        .route("/", get(index))
        .with_state(ctx.clone())
        .nest(AUTH_ROUTE_PREFIX.as_str(), auth_router(ctx.clone()));

    if let Err(e) = spawn_http_server(ctx.config().port, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
