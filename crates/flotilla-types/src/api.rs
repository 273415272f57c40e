//! Request and response bodies for the fleet HTTP API.
//!
//! These are transient: they exist only for the duration of one call and
//! are never stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ids::{RobotId, TaskId};
use crate::wire::Priority;

/// Acceptance status reported back for a dispatched task.
pub const TASK_STATUS_SCHEDULED: &str = "scheduled";

/// Acknowledgement text for an accepted cancel request.
pub const CANCEL_ACK: &str = "cancel command sent";

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Robot the task targets. The caller picks the robot; the server only
    /// validates availability.
    pub robot_id: RobotId,
    /// Target pose for the task, as named numeric fields.
    pub target_position: BTreeMap<String, f64>,
    /// Requested priority; defaults to normal when omitted.
    #[serde(default)]
    pub priority: Priority,
}

/// Successful response to `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Server-minted identifier for the dispatched task.
    pub task_id: TaskId,
    /// Robot the task was dispatched to, echoed from the request.
    pub robot_id: RobotId,
    /// Acceptance status, always [`TASK_STATUS_SCHEDULED`] on success.
    pub status: String,
}

impl TaskResponse {
    /// Build the response for a successfully dispatched task.
    pub fn scheduled(task_id: TaskId, robot_id: RobotId) -> Self {
        Self {
            task_id,
            robot_id,
            status: TASK_STATUS_SCHEDULED.to_owned(),
        }
    }
}

/// Successful response to `POST /api/robots/{robot_id}/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelResponse {
    /// Acknowledgement text, always [`CANCEL_ACK`].
    pub status: String,
}

impl CancelResponse {
    /// Build the acknowledgement for an accepted cancel.
    pub fn sent() -> Self {
        Self {
            status: CANCEL_ACK.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn task_request_priority_defaults_to_normal() {
        let request: TaskRequest = serde_json::from_value(serde_json::json!({
            "robot_id": "r1",
            "target_position": {"x": 3.0, "y": 4.0}
        }))
        .unwrap();
        assert_eq!(request.priority, Priority::Normal);
        assert_eq!(request.robot_id, RobotId::from("r1"));
    }

    #[test]
    fn scheduled_response_echoes_robot_id() {
        let task_id = TaskId::new();
        let response = TaskResponse::scheduled(task_id, RobotId::from("r9"));
        assert_eq!(response.task_id, task_id);
        assert_eq!(response.robot_id, RobotId::from("r9"));
        assert_eq!(response.status, TASK_STATUS_SCHEDULED);
    }
}
