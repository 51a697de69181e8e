//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Configure CORS for browser access
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let v1 = Router::new()
        .route("/multisig", post(handlers::create_multisig_tx))
        .route("/multisig/issue", post(handlers::issue_multisig_tx))
        .route("/multisig/cancel", post(handlers::cancel_multisig_tx))
        // GET takes the path segment as an alias, PUT as a transaction id
        .route(
            "/multisig/{id}",
            put(handlers::sign_multisig_tx).get(handlers::get_all_multisig_tx_for_alias),
        );

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .nest("/v1", v1)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
