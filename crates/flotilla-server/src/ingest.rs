//! Bridge from bus state reports into the registry and live feed.
//!
//! Robots publish partial state on `fleet.robot.{id}.state.{category}`.
//! Each message is decoded into a typed field, applied to the registry
//! under a short-lived write lock, and fanned out to feed observers as
//! a state-update envelope.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use flotilla_api::state::AppState;
use flotilla_core::subjects;
use flotilla_types::{FeedEnvelope, StateField};
use futures::StreamExt as _;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::FlotillaError;

/// Decode one state report payload according to its subject category.
///
/// `pose` requires a map of named coordinates, `battery` a number, and
/// `status` a string. Any other category is stored verbatim as custom
/// state.
///
/// # Errors
///
/// Returns [`FlotillaError::Parse`] if the payload is not valid JSON or
/// does not have the shape the category requires.
pub fn decode_field(category: &str, payload: &[u8]) -> Result<StateField, FlotillaError> {
    match category {
        "pose" => {
            let pose: BTreeMap<String, f64> =
                serde_json::from_slice(payload).map_err(|e| FlotillaError::Parse {
                    message: format!("invalid pose payload: {e}"),
                })?;
            Ok(StateField::Pose(pose))
        }
        "battery" => {
            let value: Value =
                serde_json::from_slice(payload).map_err(|e| FlotillaError::Parse {
                    message: format!("invalid battery payload: {e}"),
                })?;
            let battery = value.as_f64().ok_or_else(|| FlotillaError::Parse {
                message: format!("battery payload is not a number: {value}"),
            })?;
            Ok(StateField::Battery(battery))
        }
        "status" => {
            let value: Value =
                serde_json::from_slice(payload).map_err(|e| FlotillaError::Parse {
                    message: format!("invalid status payload: {e}"),
                })?;
            let status = value.as_str().ok_or_else(|| FlotillaError::Parse {
                message: format!("status payload is not a string: {value}"),
            })?;
            Ok(StateField::Status(status.to_owned()))
        }
        _ => {
            let value: Value =
                serde_json::from_slice(payload).map_err(|e| FlotillaError::Parse {
                    message: format!("invalid {category} payload: {e}"),
                })?;
            Ok(StateField::Custom {
                category: category.to_owned(),
                value,
            })
        }
    }
}

/// Consume state reports until the subscription closes.
///
/// Malformed subjects and undecodable payloads are logged and dropped
/// without touching the registry, so a bad report never refreshes a
/// robot's liveness. The registry lock is released before the feed
/// broadcast.
pub async fn run_ingest(state: Arc<AppState>, mut reports: async_nats::Subscriber) {
    info!("state ingest bridge running");
    while let Some(message) = reports.next().await {
        let Some((robot_id, category)) = subjects::parse_state_subject(&message.subject) else {
            warn!(subject = %message.subject, "ignoring report with malformed subject");
            continue;
        };
        let field = match decode_field(&category, &message.payload) {
            Ok(field) => field,
            Err(e) => {
                warn!(
                    subject = %message.subject,
                    robot_id = %robot_id,
                    error = %e,
                    "dropping undecodable state report"
                );
                continue;
            }
        };

        let now = Utc::now();
        let state_type = field.category().to_owned();
        let data = field.to_value();
        {
            let mut registry = state.registry.write().await;
            registry.upsert_field(robot_id.clone(), field, now);
        }
        debug!(robot_id = %robot_id, state_type = state_type, "state report applied");
        state.broadcast(FeedEnvelope::state_update(robot_id, state_type, data, now));
    }
    warn!("state report subscription closed, ingest bridge stopping");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn decode_valid_pose() {
        let field = decode_field("pose", br#"{"x": 1.5, "y": -2.0, "theta": 0.7}"#).unwrap();
        let StateField::Pose(pose) = field else {
            panic!("expected a pose field");
        };
        assert_eq!(pose.get("x"), Some(&1.5));
        assert_eq!(pose.get("theta"), Some(&0.7));
    }

    #[test]
    fn decode_pose_rejects_non_numeric_coordinates() {
        let result = decode_field("pose", br#"{"x": "north"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn decode_valid_battery() {
        let field = decode_field("battery", b"87.5").unwrap();
        let StateField::Battery(battery) = field else {
            panic!("expected a battery field");
        };
        assert_eq!(battery, 87.5);
    }

    #[test]
    fn decode_battery_rejects_strings() {
        let result = decode_field("battery", br#""full""#);
        assert!(matches!(result, Err(FlotillaError::Parse { .. })));
    }

    #[test]
    fn decode_valid_status() {
        let field = decode_field("status", br#""charging""#).unwrap();
        assert!(matches!(field, StateField::Status(s) if s == "charging"));
    }

    #[test]
    fn decode_status_rejects_numbers() {
        let result = decode_field("status", b"3");
        assert!(matches!(result, Err(FlotillaError::Parse { .. })));
    }

    #[test]
    fn decode_unknown_category_is_custom_state() {
        let field = decode_field("gripper", br#"{"open": true}"#).unwrap();
        let StateField::Custom { category, value } = field else {
            panic!("expected a custom field");
        };
        assert_eq!(category, "gripper");
        assert_eq!(value["open"], true);
    }

    #[test]
    fn decode_invalid_json_is_a_parse_error() {
        let result = decode_field("pose", b"not json");
        assert!(matches!(result, Err(FlotillaError::Parse { .. })));
    }
}
