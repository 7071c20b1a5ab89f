//! Thin `axum` HTTP/WebSocket adapter over `dispatch_core` (§6 of the
//! design: HTTP surface, WebSocket broadcast, the two concurrency locks).

pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use state::AdapterState;

/// Builds the full router over a shared [`AdapterState`].
pub fn router(state: Arc<AdapterState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/drivers", post(routes::register_driver).get(routes::list_drivers))
        .route("/start_system", post(routes::start_system))
        .route("/orders", post(routes::admit_order))
        .route("/update_routes", post(routes::update_routes))
        .route("/advance_time", post(routes::advance_time))
        .route("/ws/:client_id", get(ws::ws_upgrade))
        .with_state(state)
}
