//! Order API Module
//!
//! The full order lifecycle surface: intake, status transitions, delivery
//! verification, rating, purge and queries.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Intake
        .route("/", post(handler::place_order))
        // Lifecycle
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/ready", post(handler::mark_ready))
        .route("/{id}/verify", post(handler::verify_delivery))
        .route("/{id}/rating", post(handler::rate_order))
        // Queries + purge
        .route("/{id}", get(handler::get_by_id).delete(handler::purge))
        .route("/tracking/{tracking_number}", get(handler::get_by_tracking))
        .route("/store/{store_id}", get(handler::list_by_store))
        .route(
            "/store/{store_id}/pending",
            get(handler::list_pending_by_store),
        )
        .route("/user/{user_id}", get(handler::list_by_user))
}
