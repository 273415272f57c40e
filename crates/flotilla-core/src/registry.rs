//! The fleet registry: the single in-memory source of truth for robot state.
//!
//! One [`FleetRegistry`] instance exists per server process, shared behind a
//! lock. Every method here is synchronous and completes without suspension,
//! so callers can scope their lock guards tightly and never hold one across
//! an await point.
//!
//! Records are created implicitly when a never-before-seen robot id shows up
//! in a state report; nothing ever removes one. Silence only flips a record
//! to offline via [`FleetRegistry::sweep_offline`].

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use flotilla_types::{RobotId, RobotStateRecord, STATUS_OFFLINE, STATUS_ONLINE, StateField};

/// Why a robot cannot accept a task right now.
///
/// Every variant maps to a service-unavailable condition at the dispatch
/// boundary, with the rendered message as the reason string. An unknown id
/// is not distinguished from an unreachable robot on this path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AvailabilityError {
    /// No record exists for the requested robot id.
    #[error("robot {robot_id} is not registered")]
    Unknown {
        /// The id that missed.
        robot_id: RobotId,
    },

    /// The record exists but its status is not the online verdict.
    #[error("robot {robot_id} is unavailable: status is \"{status}\", not \"online\"")]
    NotOnline {
        /// The robot in question.
        robot_id: RobotId,
        /// The status string currently stored.
        status: String,
    },

    /// The record is online but the battery is at or under the minimum.
    #[error("robot {robot_id} is unavailable: battery at {battery:.1}%, minimum is {minimum:.1}%")]
    LowBattery {
        /// The robot in question.
        robot_id: RobotId,
        /// Last reported battery level.
        battery: f64,
        /// Configured dispatch minimum.
        minimum: f64,
    },
}

/// In-memory map from robot id to its last-known state.
///
/// Keys are never removed; a robot that falls silent keeps its record and
/// is only marked offline. Iteration order is the id order, which keeps
/// snapshots deterministic.
#[derive(Debug, Default)]
pub struct FleetRegistry {
    robots: BTreeMap<RobotId, RobotStateRecord>,
}

impl FleetRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            robots: BTreeMap::new(),
        }
    }

    /// Look up one robot's record.
    pub fn get(&self, robot_id: &RobotId) -> Option<&RobotStateRecord> {
        self.robots.get(robot_id)
    }

    /// Apply one decoded state report field to a robot's record.
    ///
    /// Creates the record on first contact. Every call refreshes
    /// `last_seen` and resets the status to online first; a `status` field
    /// then overwrites it with the robot's self-reported phase, so the
    /// stored value reflects whichever writer came last.
    pub fn upsert_field(&mut self, robot_id: RobotId, field: StateField, now: DateTime<Utc>) {
        let record = self
            .robots
            .entry(robot_id)
            .or_insert_with_key(|id| RobotStateRecord::new(id.clone(), now));

        record.last_seen = now;
        record.status = STATUS_ONLINE.to_owned();

        match field {
            StateField::Pose(pose) => record.pose = pose,
            StateField::Battery(level) => record.battery = level,
            StateField::Status(status) => record.status = status,
            StateField::Custom { category, value } => {
                record.custom_state.insert(category, value);
            }
        }
    }

    /// Snapshot every known record, in id order.
    pub fn list_all(&self) -> Vec<RobotStateRecord> {
        self.robots.values().cloned().collect()
    }

    /// Mark one robot offline.
    ///
    /// Returns `true` only when a transition actually happened: the robot
    /// is known and was not already offline. Callers use the return value
    /// to emit the offline event exactly once.
    pub fn mark_offline(&mut self, robot_id: &RobotId) -> bool {
        match self.robots.get_mut(robot_id) {
            Some(record) if record.status != STATUS_OFFLINE => {
                record.status = STATUS_OFFLINE.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Flip every robot silent for longer than `threshold` to offline.
    ///
    /// Returns the ids that transitioned on this sweep, in id order. A
    /// robot already offline never appears again, so a caller emitting one
    /// event per returned id gets exactly-once offline notifications no
    /// matter how often it sweeps.
    pub fn sweep_offline(&mut self, now: DateTime<Utc>, threshold: TimeDelta) -> Vec<RobotId> {
        let mut transitioned = Vec::new();
        for (robot_id, record) in &mut self.robots {
            let silent_for = now.signed_duration_since(record.last_seen);
            if silent_for > threshold && record.status != STATUS_OFFLINE {
                record.status = STATUS_OFFLINE.to_owned();
                transitioned.push(robot_id.clone());
            }
        }
        transitioned
    }

    /// Check whether a robot may accept a task right now.
    ///
    /// Requires the record to exist, its status to be exactly the online
    /// verdict, and its battery to be strictly above `min_battery`. The
    /// caller decides what to do with the answer; this method never
    /// mutates.
    pub fn check_available(
        &self,
        robot_id: &RobotId,
        min_battery: f64,
    ) -> Result<(), AvailabilityError> {
        let record = self.get(robot_id).ok_or_else(|| AvailabilityError::Unknown {
            robot_id: robot_id.clone(),
        })?;

        if !record.is_online() {
            return Err(AvailabilityError::NotOnline {
                robot_id: robot_id.clone(),
                status: record.status.clone(),
            });
        }

        if record.battery <= min_battery {
            return Err(AvailabilityError::LowBattery {
                robot_id: robot_id.clone(),
                battery: record.battery,
                minimum: min_battery,
            });
        }

        Ok(())
    }

    /// Number of robots ever seen.
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Whether no robot has reported yet.
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::Duration;
    use flotilla_types::DEFAULT_BATTERY_PERCENT;

    const MIN_BATTERY: f64 = 20.0;

    fn at(base: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
        base.checked_add_signed(Duration::seconds(seconds)).unwrap()
    }

    fn battery(level: f64) -> StateField {
        StateField::Battery(level)
    }

    #[test]
    fn first_update_creates_online_record_with_update_time() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        registry.upsert_field(RobotId::from("r1"), battery(77.0), now);

        let record = registry.get(&RobotId::from("r1")).unwrap();
        assert_eq!(record.status, STATUS_ONLINE);
        assert_eq!(record.last_seen, now);
        assert_eq!(record.battery, 77.0);
    }

    #[test]
    fn applying_the_same_update_twice_is_idempotent() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), battery(50.0), now);
        let after_one = registry.get(&id).unwrap().clone();

        registry.upsert_field(id.clone(), battery(50.0), now);
        let after_two = registry.get(&id).unwrap().clone();

        assert_eq!(after_one, after_two);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn pose_report_replaces_the_whole_map() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");

        let mut first = std::collections::BTreeMap::new();
        first.insert("x".to_owned(), 1.0);
        first.insert("theta".to_owned(), 0.5);
        registry.upsert_field(id.clone(), StateField::Pose(first), now);

        let mut second = std::collections::BTreeMap::new();
        second.insert("x".to_owned(), 2.0);
        registry.upsert_field(id.clone(), StateField::Pose(second), now);

        let record = registry.get(&id).unwrap();
        assert_eq!(record.pose.len(), 1);
        assert_eq!(record.pose.get("x"), Some(&2.0));
        assert!(!record.pose.contains_key("theta"));
    }

    #[test]
    fn status_report_keeps_the_reported_phase() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), StateField::Status("running".to_owned()), now);

        // The reported phase wins over the online reset, so the robot is
        // not dispatchable until some other category updates it.
        let record = registry.get(&id).unwrap();
        assert_eq!(record.status, "running");
        assert!(!record.is_online());

        registry.upsert_field(id.clone(), battery(90.0), now);
        assert!(registry.get(&id).unwrap().is_online());
    }

    #[test]
    fn custom_categories_store_last_value_only() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(
            id.clone(),
            StateField::Custom {
                category: "gripper".to_owned(),
                value: serde_json::json!({"open": true}),
            },
            now,
        );
        registry.upsert_field(
            id.clone(),
            StateField::Custom {
                category: "gripper".to_owned(),
                value: serde_json::json!({"open": false}),
            },
            now,
        );

        let record = registry.get(&id).unwrap();
        assert_eq!(record.custom_state.len(), 1);
        assert_eq!(
            record.custom_state.get("gripper"),
            Some(&serde_json::json!({"open": false}))
        );
    }

    #[test]
    fn sweep_marks_silent_robots_exactly_once() {
        let mut registry = FleetRegistry::new();
        let base = Utc::now();
        registry.upsert_field(RobotId::from("r2"), battery(80.0), base);

        let threshold = Duration::seconds(5);

        // Within the threshold nothing happens.
        assert!(registry.sweep_offline(at(base, 5), threshold).is_empty());

        // Past the threshold the robot transitions once.
        let transitioned = registry.sweep_offline(at(base, 6), threshold);
        assert_eq!(transitioned, vec![RobotId::from("r2")]);
        assert_eq!(registry.get(&RobotId::from("r2")).unwrap().status, STATUS_OFFLINE);

        // Further sweeps while it stays silent report nothing.
        assert!(registry.sweep_offline(at(base, 7), threshold).is_empty());
        assert!(registry.sweep_offline(at(base, 60), threshold).is_empty());
    }

    #[test]
    fn resumed_robot_goes_back_online_through_a_normal_update() {
        let mut registry = FleetRegistry::new();
        let base = Utc::now();
        let id = RobotId::from("r2");
        registry.upsert_field(id.clone(), battery(80.0), base);
        registry.sweep_offline(at(base, 10), Duration::seconds(5));
        assert_eq!(registry.get(&id).unwrap().status, STATUS_OFFLINE);

        registry.upsert_field(id.clone(), battery(79.0), at(base, 11));
        assert!(registry.get(&id).unwrap().is_online());

        // And it can go offline again later, transitioning once more.
        let transitioned = registry.sweep_offline(at(base, 30), Duration::seconds(5));
        assert_eq!(transitioned, vec![id]);
    }

    #[test]
    fn mark_offline_reports_whether_a_transition_happened() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), battery(50.0), now);

        assert!(registry.mark_offline(&id));
        assert!(!registry.mark_offline(&id));
        assert!(!registry.mark_offline(&RobotId::from("ghost")));
    }

    #[test]
    fn records_are_never_removed() {
        let mut registry = FleetRegistry::new();
        let base = Utc::now();
        registry.upsert_field(RobotId::from("r1"), battery(50.0), base);
        registry.sweep_offline(at(base, 3600), Duration::seconds(5));

        assert_eq!(registry.len(), 1);
        assert!(registry.get(&RobotId::from("r1")).is_some());
    }

    #[test]
    fn availability_requires_known_online_and_charged() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();

        let err = registry
            .check_available(&RobotId::from("r3"), MIN_BATTERY)
            .unwrap_err();
        assert!(matches!(err, AvailabilityError::Unknown { .. }));

        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), battery(55.0), now);
        assert!(registry.check_available(&id, MIN_BATTERY).is_ok());

        registry.mark_offline(&id);
        let err = registry.check_available(&id, MIN_BATTERY).unwrap_err();
        assert!(matches!(err, AvailabilityError::NotOnline { .. }));
    }

    #[test]
    fn low_battery_rejection_names_the_battery() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), battery(15.0), now);

        let err = registry.check_available(&id, MIN_BATTERY).unwrap_err();
        assert!(matches!(err, AvailabilityError::LowBattery { .. }));
        assert!(err.to_string().contains("battery"));
    }

    #[test]
    fn battery_exactly_at_the_minimum_is_rejected() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");
        registry.upsert_field(id.clone(), battery(MIN_BATTERY), now);

        let err = registry.check_available(&id, MIN_BATTERY).unwrap_err();
        assert!(matches!(err, AvailabilityError::LowBattery { .. }));
    }

    #[test]
    fn fresh_robot_is_refused_until_battery_reported() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        let id = RobotId::from("r1");

        // A robot that has only ever sent a pose still carries the zero
        // default battery, so dispatch refuses it until a real level
        // arrives.
        let mut pose = std::collections::BTreeMap::new();
        pose.insert("x".to_owned(), 0.0);
        registry.upsert_field(id.clone(), StateField::Pose(pose), now);

        let record = registry.get(&id).unwrap();
        assert_eq!(record.battery, DEFAULT_BATTERY_PERCENT);
        let err = registry.check_available(&id, MIN_BATTERY).unwrap_err();
        assert!(matches!(err, AvailabilityError::LowBattery { .. }));

        registry.upsert_field(id.clone(), battery(55.0), now);
        assert!(registry.check_available(&id, MIN_BATTERY).is_ok());
    }

    #[test]
    fn list_all_returns_records_in_id_order() {
        let mut registry = FleetRegistry::new();
        let now = Utc::now();
        registry.upsert_field(RobotId::from("zulu"), battery(10.0), now);
        registry.upsert_field(RobotId::from("alpha"), battery(20.0), now);

        let ids: Vec<String> = registry
            .list_all()
            .into_iter()
            .map(|r| r.robot_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["alpha".to_owned(), "zulu".to_owned()]);
    }
}
