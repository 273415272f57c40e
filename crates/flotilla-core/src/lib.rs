//! Fleet registry, availability policy, and configuration for the Flotilla
//! fleet server.
//!
//! This crate holds the domain logic with no HTTP or transport dependency:
//! the in-memory registry that tracks every robot's last-known state, the
//! availability rules that gate command dispatch, the seam the dispatcher
//! publishes through, and the typed configuration loader.
//!
//! # Modules
//!
//! - [`registry`] -- [`FleetRegistry`] and the availability policy.
//! - [`config`] -- Configuration loading from `flotilla-config.yaml` into
//!   strongly-typed structs.
//! - [`bus`] -- [`CommandBus`] trait and bus error taxonomy.
//! - [`subjects`] -- Bus subject grammar shared by publishers and the
//!   ingest bridge.
//!
//! [`FleetRegistry`]: registry::FleetRegistry
//! [`CommandBus`]: bus::CommandBus

pub mod bus;
pub mod config;
pub mod registry;
pub mod subjects;

pub use bus::{BusError, CommandBus};
pub use config::{ConfigError, FleetConfig};
pub use registry::{AvailabilityError, FleetRegistry};
