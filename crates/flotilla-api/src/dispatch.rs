//! The command dispatcher: availability gating and command publication.
//!
//! Dispatch is check-then-publish: availability is decided under a read
//! guard that drops before the bus publish awaits, so an update arriving
//! between the check and the publish can win the race. That window is one
//! scheduling quantum and is accepted; the alternative would serialize all
//! dispatches behind bus I/O.
//!
//! The dispatcher never picks a robot. Callers name the target; this
//! module only answers whether that robot may be commanded right now.

use chrono::Utc;
use flotilla_core::subjects;
use flotilla_types::{
    CancelCommand, CancelResponse, DeliveryClass, RobotId, TaskCommand, TaskId, TaskRequest,
    TaskResponse,
};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

/// Validate availability and publish a task command to one robot.
///
/// Succeeds only when the robot is known, its status is the online
/// verdict, and its battery is above the configured minimum. On success
/// the command envelope goes out on the robot's task subject with the
/// delivery class the requested priority maps to, and the minted task id
/// is returned to the caller. Every rejection surfaces as the unavailable
/// condition, an unknown robot id included.
pub async fn dispatch_task(state: &AppState, request: TaskRequest) -> Result<TaskResponse, ApiError> {
    {
        let registry = state.registry.read().await;
        registry.check_available(&request.robot_id, state.dispatch.min_battery_percent)?;
    }

    let task_id = TaskId::new();
    let command = TaskCommand {
        task_id,
        target_position: request.target_position,
        priority: request.priority,
        timestamp: Utc::now(),
    };
    let payload = serde_json::to_vec(&command)?;

    state
        .bus
        .publish(
            subjects::task_subject(&request.robot_id),
            request.priority.delivery_class(),
            payload,
        )
        .await?;

    info!(
        robot_id = %request.robot_id,
        task_id = %task_id,
        priority = ?request.priority,
        "task dispatched"
    );

    Ok(TaskResponse::scheduled(task_id, request.robot_id))
}

/// Publish a cancel command to one robot.
///
/// Requires the robot to be known; availability is deliberately not
/// re-checked, so an offline or drained robot can still be told to stop.
/// Cancels always go out at real-time delivery. There is no check that a
/// task is actually in progress.
pub async fn cancel_task(state: &AppState, robot_id: RobotId) -> Result<CancelResponse, ApiError> {
    {
        let registry = state.registry.read().await;
        if registry.get(&robot_id).is_none() {
            return Err(ApiError::NotFound(format!(
                "robot {robot_id} is not registered"
            )));
        }
    }

    let cancel = CancelCommand::user_request(Utc::now());
    let payload = serde_json::to_vec(&cancel)?;

    state
        .bus
        .publish(
            subjects::cancel_subject(&robot_id),
            DeliveryClass::RealTime,
            payload,
        )
        .await?;

    info!(robot_id = %robot_id, "cancel dispatched");

    Ok(CancelResponse::sent())
}
