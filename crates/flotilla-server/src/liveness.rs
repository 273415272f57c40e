//! Background liveness monitor.
//!
//! Periodically sweeps the registry and marks robots offline when their
//! last report is older than the configured threshold. Each transition
//! is announced to feed observers as a `status` update and to the bus
//! as a system event, and fires exactly once until the robot reports
//! again.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use flotilla_api::state::AppState;
use flotilla_core::subjects::ROBOT_OFFLINE_SUBJECT;
use flotilla_types::{DeliveryClass, FeedEnvelope, RobotOfflineEvent, STATUS_OFFLINE, StateField};
use tracing::{error, info, warn};

/// Run one sweep and announce every robot marked offline.
///
/// The registry lock is released before any envelope leaves the
/// process, so feed and bus publishes never block state ingest.
pub async fn sweep_once(state: &AppState, threshold: TimeDelta) {
    let now = Utc::now();
    let marked = {
        let mut registry = state.registry.write().await;
        registry.sweep_offline(now, threshold)
    };

    for robot_id in marked {
        info!(robot_id = %robot_id, "robot marked offline, no reports within threshold");
        let field = StateField::Status(STATUS_OFFLINE.to_owned());
        state.broadcast(FeedEnvelope::state_update(
            robot_id.clone(),
            field.category().to_owned(),
            field.to_value(),
            now,
        ));

        let event = RobotOfflineEvent {
            robot_id: robot_id.clone(),
            timestamp: now,
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(robot_id = %robot_id, error = %e, "failed to serialize offline event");
                continue;
            }
        };
        let publish = state
            .bus
            .publish(ROBOT_OFFLINE_SUBJECT.to_owned(), DeliveryClass::Normal, payload);
        if let Err(e) = publish.await {
            warn!(robot_id = %robot_id, error = %e, "failed to publish offline event");
        }
    }
}

/// Run the periodic liveness monitor until the task is aborted.
pub async fn run_liveness(state: Arc<AppState>, threshold: TimeDelta, period: std::time::Duration) {
    info!(
        threshold_secs = threshold.num_seconds(),
        sweep_interval_secs = period.as_secs(),
        "liveness monitor running"
    );
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately; consume it so the first
    // sweep happens one full interval after startup.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        sweep_once(&state, threshold).await;
    }
}
