//! TUNDRA - Synthetic telemetry simulator and MQTT publisher
//!
//! Simulates a fleet of moving sensors (positions integrated from constant
//! velocities over wall-clock time) and a scalar temperature/humidity/
//! pressure generator, and publishes enveloped JSON readings to an MQTT
//! broker at a fixed cadence.
//!
//! # Examples
//!
//! ```no_run
//! use tundra::{Config, Entity, FleetPublisher, MqttTransport};
//!
//! # async fn run() -> tundra::Result<()> {
//! let config = Config::load(None)?;
//!
//! let mut units = Vec::new();
//! for spec in &config.fleet.entities {
//!     let mut entity = Entity::from_config(spec);
//!     entity.start();
//!     let client_id = format!("Client_Study_{}", entity.name());
//!     let transport = MqttTransport::connect(&config.mqtt, &client_id).await?;
//!     units.push((entity, transport));
//! }
//!
//! let mut publisher = FleetPublisher::new(&config.fleet, units);
//! publisher.run().await?;
//! publisher.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Error handling with structured error types
pub mod error;

/// Configuration management with YAML support and validation
pub mod config;

/// Moving-sensor position simulation
pub mod entity;

/// Deterministic scalar telemetry generator
pub mod generator;

/// Wire payload envelopes
pub mod payload;

/// MQTT transport and the transport seam used by the publishers
pub mod mqtt;

/// Publish loops driving the simulators at a fixed cadence
pub mod publisher;

pub use config::{Config, EntityConfig, FleetConfig, MqttConfig, ReadingsConfig};
pub use entity::{Entity, Position, Snapshot};
pub use error::{Result, TelemetryError};
pub use generator::{Reading, ScalarSequence};
pub use mqtt::{MqttTransport, Transport};
pub use payload::{HelloPayload, PositionPayload, ReadingPayload};
pub use publisher::{publish_hello, FleetPublisher, PublishStats, ReadingsPublisher};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
