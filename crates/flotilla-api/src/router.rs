//! Axum router construction for the fleet API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the fleet server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` live update feed
/// - `GET /api/robots` -- list all known robots
/// - `GET /api/robots/:robot_id` -- single robot record
/// - `POST /api/tasks` -- dispatch a task
/// - `POST /api/robots/:robot_id/cancel` -- cancel a robot's task
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_feed))
        // REST API
        .route("/api/robots", get(handlers::list_robots))
        .route("/api/robots/{robot_id}", get(handlers::get_robot))
        .route("/api/tasks", post(handlers::create_task))
        .route("/api/robots/{robot_id}/cancel", post(handlers::cancel_task))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
