//! NATS-backed transport for the fleet server.
//!
//! One connection serves both directions: the ingest bridge consumes
//! robot state reports from `fleet.robot.*.state.>`, and the dispatch
//! path publishes task and cancel commands with a `Fleet-Priority`
//! header announcing the delivery class to downstream consumers.

use async_nats::HeaderMap;
use async_trait::async_trait;
use flotilla_core::subjects::STATE_WILDCARD;
use flotilla_core::{BusError, CommandBus};
use flotilla_types::DeliveryClass;
use tracing::{debug, info};

/// Header carrying the delivery class on every published command.
pub const PRIORITY_HEADER: &str = "Fleet-Priority";

/// NATS client wrapper for the fleet server.
///
/// Manages a single NATS connection and provides the state-report
/// subscription plus the outbound command publisher behind the
/// [`CommandBus`] seam.
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to a NATS server.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Connect`] if the connection cannot be
    /// established.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        info!(url = url, "connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::Connect {
                message: format!("failed to connect to {url}: {e}"),
            })?;
        info!("NATS connection established");
        Ok(Self { client })
    }

    /// Subscribe to all robot state report subjects.
    ///
    /// Returns a subscription that yields messages matching
    /// `fleet.robot.*.state.>` (all robots, all state categories).
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Subscribe`] if the subscription fails.
    pub async fn subscribe_state_reports(&self) -> Result<async_nats::Subscriber, BusError> {
        debug!(subject = STATE_WILDCARD, "subscribing to state reports");
        let subscriber = self
            .client
            .subscribe(STATE_WILDCARD.to_owned())
            .await
            .map_err(|e| BusError::Subscribe {
                message: format!("failed to subscribe to {STATE_WILDCARD}: {e}"),
            })?;
        info!("subscribed to robot state reports");
        Ok(subscriber)
    }

    /// Drain the connection, delivering buffered messages before close.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Publish`] if the drain fails.
    pub async fn drain(&self) -> Result<(), BusError> {
        self.client.drain().await.map_err(|e| BusError::Publish {
            message: format!("drain failed: {e}"),
        })
    }
}

#[async_trait]
impl CommandBus for NatsBus {
    async fn publish(
        &self,
        subject: String,
        class: DeliveryClass,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        let mut headers = HeaderMap::new();
        headers.insert(PRIORITY_HEADER, class.header_value());
        debug!(
            subject = subject,
            class = class.header_value(),
            "publishing command"
        );
        self.client
            .publish_with_headers(subject.clone(), headers, payload.into())
            .await
            .map_err(|e| BusError::Publish {
                message: format!("failed to publish to {subject}: {e}"),
            })?;
        // A dispatch acknowledged over HTTP must not sit in the client
        // buffer; flush bounds that window.
        self.client.flush().await.map_err(|e| BusError::Publish {
            message: format!("flush failed: {e}"),
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for NatsBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NatsBus")
            .field("connected", &true)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests that require a live NATS server are marked #[ignore].
    #[tokio::test]
    #[ignore]
    async fn connect_to_nats() {
        let result = NatsBus::connect("nats://localhost:4222").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn subscribe_to_state_reports() {
        let Ok(bus) = NatsBus::connect("nats://localhost:4222").await else {
            tracing::error!("NATS connection failed");
            return;
        };
        let result = bus.subscribe_state_reports().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn publish_carries_priority_header() {
        let Ok(bus) = NatsBus::connect("nats://localhost:4222").await else {
            tracing::error!("NATS connection failed");
            return;
        };
        let result = bus
            .publish(
                "fleet.robot.r1.cmd.task".to_owned(),
                DeliveryClass::RealTime,
                b"{}".to_vec(),
            )
            .await;
        assert!(result.is_ok());
    }
}
