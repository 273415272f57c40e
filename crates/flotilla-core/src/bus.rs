//! The outbound bus seam used by the dispatcher and liveness monitor.
//!
//! Components that publish control traffic depend on [`CommandBus`] rather
//! than a concrete client, so the HTTP surface can be exercised in tests
//! with a recording implementation while production wires in the NATS
//! client.

use async_trait::async_trait;
use flotilla_types::DeliveryClass;

/// Errors raised by bus implementations.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// Could not establish the bus connection.
    #[error("bus connect failed: {message}")]
    Connect {
        /// Client-reported cause.
        message: String,
    },

    /// Could not subscribe to a subject pattern.
    #[error("bus subscribe failed: {message}")]
    Subscribe {
        /// Client-reported cause.
        message: String,
    },

    /// A publish was not accepted by the bus.
    #[error("bus publish failed: {message}")]
    Publish {
        /// Client-reported cause.
        message: String,
    },

    /// An outbound payload could not be serialized.
    #[error("payload serialization failed: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Outbound publish capability for control messages and system events.
///
/// Implementations must confirm the message was handed to the bus before
/// returning, so a caller's success response means the command actually
/// left the process.
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// Publish one message to `subject` with the given delivery class.
    async fn publish(
        &self,
        subject: String,
        class: DeliveryClass,
        payload: Vec<u8>,
    ) -> Result<(), BusError>;
}
