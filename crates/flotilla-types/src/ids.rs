//! Identifier types for robots and dispatched tasks.
//!
//! Robot identifiers are opaque strings minted by the robot agents
//! themselves (stable for the agent's process lifetime); the server never
//! fabricates one. Task identifiers are generated server-side per dispatch
//! using UUID v7 (time-ordered), so two dispatches in the same second can
//! never collide.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier a robot agent assigns to itself.
///
/// Used as the registry key and as a bus subject token. The server treats
/// it as an opaque string; uniqueness is the agent's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotId(String);

impl RobotId {
    /// Wrap a raw identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for RobotId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RobotId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RobotId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Unique identifier for a dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for TaskId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<TaskId> for Uuid {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robot_id_serializes_transparently() {
        let id = RobotId::new("robot-7");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"robot-7\"");
    }

    #[test]
    fn task_ids_are_unique_and_ordered() {
        let a = TaskId::new();
        let b = TaskId::new();
        // UUID v7 is time-ordered, so a freshly minted id sorts after
        // (or equal in the same timestamp tick, but never colliding with)
        // the previous one.
        assert_ne!(a, b);
        assert!(a <= b);
    }

    #[test]
    fn robot_id_display_matches_inner() {
        let id = RobotId::from("r1");
        assert_eq!(id.to_string(), "r1");
        assert_eq!(id.as_str(), "r1");
    }
}
