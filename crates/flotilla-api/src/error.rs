//! Error types for the fleet API layer.
//!
//! [`ApiError`] unifies all caller-facing failure modes into a single enum
//! that converts into an HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Registry
//! conditions map onto it so handlers can use `?` end to end.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flotilla_core::{AvailabilityError, BusError};

/// Errors that can occur in the fleet API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested robot is not in the registry.
    #[error("not found: {0}")]
    NotFound(String),

    /// The robot cannot accept a task right now. Every dispatch rejection
    /// lands here, an unknown robot id included.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The outbound bus rejected a publish.
    #[error("bus error: {0}")]
    Bus(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

// Dispatch treats an unknown robot like any other robot it cannot command
// right now; not-found is reserved for direct lookups (get, cancel).
impl From<AvailabilityError> for ApiError {
    fn from(err: AvailabilityError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<BusError> for ApiError {
    fn from(err: BusError) -> Self {
        Self::Bus(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            Self::Serialization(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("JSON error: {e}"))
            }
            Self::Bus(msg) | Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use flotilla_types::RobotId;

    #[test]
    fn unknown_robot_maps_to_unavailable_on_dispatch() {
        let err: ApiError = AvailabilityError::Unknown {
            robot_id: RobotId::from("ghost"),
        }
        .into();
        match err {
            ApiError::Unavailable(reason) => assert!(reason.contains("not registered")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn low_battery_maps_to_unavailable_with_reason() {
        let err: ApiError = AvailabilityError::LowBattery {
            robot_id: RobotId::from("r1"),
            battery: 15.0,
            minimum: 20.0,
        }
        .into();
        match err {
            ApiError::Unavailable(reason) => assert!(reason.contains("battery")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }
}
