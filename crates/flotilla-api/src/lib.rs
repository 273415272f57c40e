//! Fleet API server for the Flotilla fleet.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) streaming every registry mutation
//!   and liveness transition via [`tokio::sync::broadcast`], with a
//!   periodic heartbeat
//! - **REST endpoints** for querying robot state (`/api/robots`,
//!   `/api/robots/:robot_id`)
//! - **Command endpoints** for dispatching and cancelling tasks
//!   (`/api/tasks`, `/api/robots/:robot_id/cancel`), gated on the
//!   registry's availability rules
//! - **Minimal HTML status page** (`GET /`) showing fleet counts and
//!   links to the API endpoints
//!
//! # Architecture
//!
//! The API reads from the in-memory
//! [`FleetRegistry`](flotilla_core::FleetRegistry) shared with the ingest
//! bridge and liveness monitor. Registry locks are scoped to synchronous
//! sections only; command publishes and feed sends happen after the guard
//! drops, so HTTP and bus I/O never serialize registry traffic.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_api};
pub use state::AppState;
