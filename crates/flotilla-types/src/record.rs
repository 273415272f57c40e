//! Robot state records and the typed field values that mutate them.
//!
//! One [`RobotStateRecord`] exists per robot identifier ever observed on the
//! bus. Records are created implicitly on first contact, mutated by state
//! reports and liveness sweeps, and never deleted for the life of the
//! process.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::RobotId;

/// Status value written by the server whenever a state report is applied.
pub const STATUS_ONLINE: &str = "online";

/// Status value written by the liveness monitor when a robot goes silent.
pub const STATUS_OFFLINE: &str = "offline";

/// Battery level assumed for a robot that has not yet reported one.
///
/// Zero keeps an unreported battery under every dispatch minimum, so a
/// robot cannot be commanded before its first real battery report.
pub const DEFAULT_BATTERY_PERCENT: f64 = 0.0;

/// Last-known state of a single robot.
///
/// The `status` field carries both the robot's self-reported task phase and
/// the server's reachability verdict; whichever wrote last wins. Every
/// applied state report resets it to [`STATUS_ONLINE`] (a `status` report
/// then overwrites it with the reported phase), and the liveness monitor
/// sets it to [`STATUS_OFFLINE`] after prolonged silence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotStateRecord {
    /// Identifier the robot assigned to itself.
    pub robot_id: RobotId,
    /// Last reported pose, as named numeric fields. Replaced whole on
    /// every pose report; no history is kept.
    pub pose: BTreeMap<String, f64>,
    /// Last reported battery level in percent.
    pub battery: f64,
    /// Combined task-phase / reachability string (see type docs).
    pub status: String,
    /// Timestamp of the last applied update. Non-decreasing per robot.
    pub last_seen: DateTime<Utc>,
    /// Last value per state category outside pose/battery/status.
    pub custom_state: BTreeMap<String, Value>,
}

impl RobotStateRecord {
    /// Create a fresh record for a robot seen for the first time.
    ///
    /// Battery starts at [`DEFAULT_BATTERY_PERCENT`] until the robot
    /// reports a real level; status starts offline and is flipped online
    /// by the first applied update.
    pub fn new(robot_id: RobotId, now: DateTime<Utc>) -> Self {
        Self {
            robot_id,
            pose: BTreeMap::new(),
            battery: DEFAULT_BATTERY_PERCENT,
            status: STATUS_OFFLINE.to_owned(),
            last_seen: now,
            custom_state: BTreeMap::new(),
        }
    }

    /// Whether the stored status is exactly the server's online verdict.
    ///
    /// A robot whose last report was a task phase (e.g. `running`) is not
    /// online by this check until some other update resets the field.
    pub fn is_online(&self) -> bool {
        self.status == STATUS_ONLINE
    }
}

/// A decoded state report field, ready to apply to a record.
///
/// The ingest bridge validates raw payloads into this type before any
/// registry mutation, so a malformed report is dropped whole and never
/// half-applies.
#[derive(Debug, Clone, PartialEq)]
pub enum StateField {
    /// Full replacement for the pose map.
    Pose(BTreeMap<String, f64>),
    /// New battery level in percent.
    Battery(f64),
    /// Self-reported status string (task phase).
    Status(String),
    /// Arbitrary value for a category outside the fixed three.
    Custom {
        /// Category name taken from the report's topic suffix.
        category: String,
        /// Reported value, stored verbatim.
        value: Value,
    },
}

impl StateField {
    /// The category name this field is reported and broadcast under.
    pub fn category(&self) -> &str {
        match self {
            Self::Pose(_) => "pose",
            Self::Battery(_) => "battery",
            Self::Status(_) => "status",
            Self::Custom { category, .. } => category,
        }
    }

    /// Render the field's value as JSON for broadcast envelopes.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Pose(pose) => Value::Object(
                pose.iter()
                    .map(|(name, v)| (name.clone(), number(*v)))
                    .collect(),
            ),
            Self::Battery(level) => number(*level),
            Self::Status(status) => Value::String(status.clone()),
            Self::Custom { value, .. } => value.clone(),
        }
    }
}

/// JSON numbers cannot carry non-finite values; those become null.
fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_starts_offline_with_empty_battery() {
        let now = Utc::now();
        let record = RobotStateRecord::new(RobotId::from("r1"), now);
        assert_eq!(record.status, STATUS_OFFLINE);
        assert_eq!(record.battery, 0.0);
        assert!(record.pose.is_empty());
        assert!(record.custom_state.is_empty());
        assert_eq!(record.last_seen, now);
        assert!(!record.is_online());
    }

    #[test]
    fn state_field_categories() {
        assert_eq!(StateField::Battery(42.0).category(), "battery");
        assert_eq!(StateField::Pose(BTreeMap::new()).category(), "pose");
        assert_eq!(StateField::Status("idle".to_owned()).category(), "status");
        let custom = StateField::Custom {
            category: "gripper".to_owned(),
            value: Value::Bool(true),
        };
        assert_eq!(custom.category(), "gripper");
    }

    #[test]
    fn pose_field_renders_as_json_object() {
        let mut pose = BTreeMap::new();
        pose.insert("x".to_owned(), 1.5);
        pose.insert("y".to_owned(), -2.0);
        let value = StateField::Pose(pose).to_value();
        assert_eq!(value, serde_json::json!({"x": 1.5, "y": -2.0}));
    }
}
