//! Bus subject grammar for state reports, commands, and system events.
//!
//! Subjects are dot-delimited, NATS style:
//!
//! - `fleet.robot.{robot_id}.state.{category…}` -- inbound state reports,
//!   matched with the wildcard pattern [`STATE_WILDCARD`]. Everything after
//!   the `state` token names the category; multi-token categories keep
//!   their dots (e.g. `sensors.lidar`).
//! - `fleet.robot.{robot_id}.cmd.task` / `….cmd.cancel` -- outbound
//!   commands to one robot.
//! - `fleet.system.event.robot_offline` -- liveness transitions.

use flotilla_types::RobotId;

/// Subscription pattern matching every robot state report.
pub const STATE_WILDCARD: &str = "fleet.robot.*.state.>";

/// Subject the liveness monitor publishes offline events on.
pub const ROBOT_OFFLINE_SUBJECT: &str = "fleet.system.event.robot_offline";

/// Subject for dispatching a task to one robot.
pub fn task_subject(robot_id: &RobotId) -> String {
    format!("fleet.robot.{robot_id}.cmd.task")
}

/// Subject for cancelling one robot's current task.
pub fn cancel_subject(robot_id: &RobotId) -> String {
    format!("fleet.robot.{robot_id}.cmd.cancel")
}

/// Parse a state-report subject into `(robot_id, category)`.
///
/// Returns `None` for anything that does not match the grammar: wrong
/// prefix, missing tokens, an empty robot id, or an empty category. The
/// ingest bridge treats `None` as malformed input and drops the message.
pub fn parse_state_subject(subject: &str) -> Option<(RobotId, String)> {
    let mut tokens = subject.split('.');
    if tokens.next() != Some("fleet") || tokens.next() != Some("robot") {
        return None;
    }
    let robot_id = tokens.next().filter(|id| !id.is_empty())?;
    if tokens.next() != Some("state") {
        return None;
    }
    let category = tokens.collect::<Vec<_>>().join(".");
    if category.is_empty() {
        return None;
    }
    Some((RobotId::from(robot_id), category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_category() {
        let parsed = parse_state_subject("fleet.robot.r1.state.pose");
        assert_eq!(parsed, Some((RobotId::from("r1"), "pose".to_owned())));
    }

    #[test]
    fn parse_multi_token_category() {
        let parsed = parse_state_subject("fleet.robot.amr-12.state.sensors.lidar");
        assert_eq!(
            parsed,
            Some((RobotId::from("amr-12"), "sensors.lidar".to_owned()))
        );
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        assert_eq!(parse_state_subject("fleet.system.event.robot_offline"), None);
        assert_eq!(parse_state_subject("other.robot.r1.state.pose"), None);
    }

    #[test]
    fn parse_rejects_missing_category() {
        assert_eq!(parse_state_subject("fleet.robot.r1.state"), None);
        assert_eq!(parse_state_subject("fleet.robot.r1.state."), None);
    }

    #[test]
    fn parse_rejects_missing_robot_id() {
        assert_eq!(parse_state_subject("fleet.robot..state.pose"), None);
        assert_eq!(parse_state_subject("fleet.robot"), None);
    }

    #[test]
    fn parse_rejects_command_subjects() {
        assert_eq!(parse_state_subject("fleet.robot.r1.cmd.task"), None);
    }

    #[test]
    fn command_subjects_embed_the_robot_id() {
        let id = RobotId::from("amr-3");
        assert_eq!(task_subject(&id), "fleet.robot.amr-3.cmd.task");
        assert_eq!(cancel_subject(&id), "fleet.robot.amr-3.cmd.cancel");
    }
}
