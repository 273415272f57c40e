//! Wire envelopes exchanged over the bus and the live update feed.
//!
//! Three envelope families exist:
//!
//! - [`FeedEnvelope`] -- pushed to every connected feed observer; either a
//!   state update or a keep-alive heartbeat, discriminated by the
//!   `message_type` field.
//! - [`TaskCommand`] / [`CancelCommand`] -- published to a single robot's
//!   command topics.
//! - [`RobotOfflineEvent`] -- system-level event published when the
//!   liveness monitor marks a robot unreachable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::{RobotId, TaskId};

/// Reason string carried by a caller-initiated cancel command.
pub const CANCEL_REASON_USER: &str = "user_request";

/// Caller-requested priority for a dispatched task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Default scheduling.
    #[default]
    Normal,
    /// Elevated scheduling; mapped to real-time delivery on the bus.
    High,
}

impl Priority {
    /// Transport-level delivery class this priority maps to.
    pub const fn delivery_class(self) -> DeliveryClass {
        match self {
            Self::Normal => DeliveryClass::Normal,
            Self::High => DeliveryClass::RealTime,
        }
    }
}

/// Transport-level scheduling hint attached to a published bus message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryClass {
    /// Default delivery.
    Normal,
    /// Elevated delivery, used for high-priority tasks and all cancels.
    RealTime,
}

impl DeliveryClass {
    /// Header value announcing this class to the bus and consumers.
    pub const fn header_value(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RealTime => "real-time",
        }
    }
}

/// Envelope pushed to live feed observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum FeedEnvelope {
    /// One applied state mutation (including liveness transitions, which
    /// appear as `status` updates).
    StateUpdate {
        /// Robot the update applies to.
        robot_id: RobotId,
        /// State category that changed (pose, battery, status, or custom).
        state_type: String,
        /// The new value, as reported.
        data: Value,
        /// When the server applied the update.
        timestamp: DateTime<Utc>,
    },
    /// Periodic keep-alive so idle feed connections stay open.
    Heartbeat {
        /// When the heartbeat was emitted.
        timestamp: DateTime<Utc>,
    },
}

impl FeedEnvelope {
    /// Build a state-update envelope for one applied mutation.
    pub const fn state_update(
        robot_id: RobotId,
        state_type: String,
        data: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self::StateUpdate {
            robot_id,
            state_type,
            data,
            timestamp,
        }
    }

    /// Build a heartbeat envelope.
    pub const fn heartbeat(timestamp: DateTime<Utc>) -> Self {
        Self::Heartbeat { timestamp }
    }
}

/// Command envelope published to `…cmd.task` for one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCommand {
    /// Server-minted identifier for this task.
    pub task_id: TaskId,
    /// Target pose the robot should drive to, as named numeric fields.
    pub target_position: BTreeMap<String, f64>,
    /// Priority the caller requested.
    pub priority: Priority,
    /// When the command was dispatched.
    pub timestamp: DateTime<Utc>,
}

/// Command envelope published to `…cmd.cancel` for one robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelCommand {
    /// When the cancel was issued.
    pub timestamp: DateTime<Utc>,
    /// Why the cancel was issued.
    pub reason: String,
}

impl CancelCommand {
    /// Build a caller-initiated cancel.
    pub fn user_request(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            reason: CANCEL_REASON_USER.to_owned(),
        }
    }
}

/// System event published when a robot is marked unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotOfflineEvent {
    /// Robot that went silent.
    pub robot_id: RobotId,
    /// When the liveness monitor made the transition.
    pub timestamp: DateTime<Utc>,
}
