//! Shared type definitions for the Flotilla fleet server.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: identifiers, robot state records, bus/feed wire envelopes,
//! and HTTP API bodies.
//!
//! # Modules
//!
//! - [`ids`] -- Robot and task identifier newtypes
//! - [`record`] -- `RobotStateRecord` and typed state field values
//! - [`wire`] -- Bus and live-feed envelopes, priority classes
//! - [`api`] -- HTTP request/response bodies

pub mod api;
pub mod ids;
pub mod record;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use api::{CANCEL_ACK, CancelResponse, TASK_STATUS_SCHEDULED, TaskRequest, TaskResponse};
pub use ids::{RobotId, TaskId};
pub use record::{
    DEFAULT_BATTERY_PERCENT, RobotStateRecord, STATUS_OFFLINE, STATUS_ONLINE, StateField,
};
pub use wire::{
    CANCEL_REASON_USER, CancelCommand, DeliveryClass, FeedEnvelope, Priority, RobotOfflineEvent,
    TaskCommand,
};
