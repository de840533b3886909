//! Gym Membership Administration Server
//!
//! Serves the gymdesk library over HTTP as a JSON API, one route per
//! administration screen:
//!
//! - `POST /login`, `POST /logout`, `GET /session`: the admin session
//! - `GET /dashboard`: headline stats, recent signups, expiring soon
//! - `POST /add-user`, `GET /user-list`, `DELETE /user-list/{id}`: registry
//! - `GET|POST /plans`, `PUT|DELETE /plans/{id}`: plan catalog
//! - `GET|POST /payment-management`: renewal billing
//! - `GET /health`: liveness and store figures, unauthenticated
//!
//! Every route except `/login` and `/health` sits behind the bearer-token
//! session gate; requests without a live session are redirected to
//! `/login`, unknown paths likewise.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{delete, get, post, put},
};
use gymdesk::config::GymdeskConfig;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod error;
pub mod observability;
pub mod routes;
pub mod state;

use error::ServerError;
pub use state::AppState;

/// Assembles the full route tree around the shared state.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let gated = Router::new()
        .route("/", get(routes::index))
        .route("/dashboard", get(routes::dashboard))
        .route("/session", get(routes::session))
        .route("/logout", post(routes::logout))
        .route("/add-user", post(routes::add_user))
        .route("/user-list", get(routes::user_list))
        .route("/user-list/{id}", delete(routes::delete_user))
        .route("/plans", get(routes::list_plans).post(routes::create_plan))
        .route("/plans/{id}", put(routes::update_plan).delete(routes::delete_plan))
        .route("/payment-management", get(routes::payment_page).post(routes::record_renewal))
        .route_layer(middleware::from_fn_with_state(state.clone(), routes::require_session));

    Router::new()
        .route("/login", post(routes::login))
        .route("/health", get(routes::health))
        .merge(gated)
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds the configured address and serves until a shutdown signal.
///
/// # Errors
///
/// Returns an error when the snapshot cannot be loaded or the address
/// cannot be bound.
pub async fn serve(config: GymdeskConfig) -> Result<(), ServerError> {
    let address = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    info!("listening on {address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
        info!("received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
