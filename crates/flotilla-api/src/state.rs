//! Shared application state for the fleet API server.
//!
//! [`AppState`] holds the three things every surface needs: the registry
//! behind its lock, the broadcast channel feeding connected observers, and
//! the outbound command bus. The ingest bridge and liveness monitor write
//! through the same handles, so REST reads, the live feed, and dispatch
//! all see one consistent store.

use std::sync::Arc;

use flotilla_core::config::{DispatchConfig, FeedConfig};
use flotilla_core::{CommandBus, FleetRegistry};
use flotilla_types::FeedEnvelope;
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for feed envelopes.
///
/// If an observer falls behind by more than this many messages it
/// receives a [`broadcast::error::RecvError::Lagged`] and resumes from
/// the oldest retained envelope.
const BROADCAST_CAPACITY: usize = 256;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// registry lock must only ever be held across synchronous registry
/// calls, never across an await; envelopes computed under the lock are
/// broadcast after the guard drops.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for live feed envelopes.
    pub feed_tx: broadcast::Sender<FeedEnvelope>,
    /// The fleet registry, shared with the ingest and liveness tasks.
    pub registry: Arc<RwLock<FleetRegistry>>,
    /// Outbound bus for commands and system events.
    pub bus: Arc<dyn CommandBus>,
    /// Dispatch gating policy.
    pub dispatch: DispatchConfig,
    /// Live feed settings.
    pub feed: FeedConfig,
}

impl AppState {
    /// Create application state with an empty registry.
    pub fn new(bus: Arc<dyn CommandBus>, dispatch: DispatchConfig, feed: FeedConfig) -> Self {
        let (feed_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            feed_tx,
            registry: Arc::new(RwLock::new(FleetRegistry::new())),
            bus,
            dispatch,
            feed,
        }
    }

    /// Subscribe to the live feed broadcast channel.
    ///
    /// Returns a receiver that yields every [`FeedEnvelope`] published
    /// from this point on. Dropping the receiver is the deregistration.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEnvelope> {
        self.feed_tx.subscribe()
    }

    /// Publish an envelope to all connected feed observers.
    ///
    /// Returns the number of receivers it reached. Zero receivers is
    /// normal when no observer is connected and is not an error.
    pub fn broadcast(&self, envelope: FeedEnvelope) -> usize {
        // send errs only when there are zero receivers, which just means
        // nobody is watching right now.
        self.feed_tx.send(envelope).unwrap_or(0)
    }
}
