use serde::Serialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::config::{FleetConfig, ReadingsConfig};
use crate::entity::Entity;
use crate::error::Result;
use crate::generator::{Reading, ScalarSequence};
use crate::mqtt::Transport;
use crate::payload::{HelloPayload, PositionPayload, ReadingPayload};

/// Topic for the hello probe publish.
pub const HELLO_TOPIC: &str = "hamk";

/// Counters reported after a publisher run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PublishStats {
    /// Total publish calls made
    pub publish_count: u64,
    /// Full rounds (fleet) or samples (readings) completed
    pub rounds_completed: u32,
}

struct FleetUnit<T> {
    entity: Entity,
    transport: T,
}

/// Drives the moving-entity fleet: each entity owns its transport
/// connection and publishes to its own sub-topic.
pub struct FleetPublisher<T> {
    units: Vec<FleetUnit<T>>,
    base_topic: String,
    rounds: u32,
    delay: Duration,
}

impl<T: Transport> FleetPublisher<T> {
    /// Pair each started entity with its transport connection.
    pub fn new(config: &FleetConfig, units: Vec<(Entity, T)>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|(entity, transport)| FleetUnit { entity, transport })
                .collect(),
            base_topic: config.base_topic.clone(),
            rounds: config.rounds,
            delay: Duration::from_millis(config.publish_delay_ms),
        }
    }

    /// Run the full publish schedule. The delay applies after every single
    /// publish, so one round over the fleet takes `units * delay`.
    /// Transport errors propagate immediately.
    pub async fn run(&mut self) -> Result<PublishStats> {
        let mut stats = PublishStats::default();

        for round in 0..self.rounds {
            for unit in &mut self.units {
                let topic = format!("{}/{}", self.base_topic, unit.entity.slug());
                let payload = serde_json::to_string(&PositionPayload::new(unit.entity.snapshot()))?;

                info!(%topic, %payload, "Publishing");
                unit.transport.publish(&topic, payload).await?;
                stats.publish_count += 1;

                sleep(self.delay).await;
            }
            stats.rounds_completed = round + 1;
        }

        Ok(stats)
    }

    /// Orderly disconnect of every still-connected transport. Called after
    /// the schedule completes and after an interrupt.
    pub async fn shutdown(&self) -> Result<()> {
        for unit in &self.units {
            if unit.transport.is_connected() {
                info!(entity = %unit.entity.name(), "Disconnecting");
                unit.transport.disconnect().await?;
            }
        }
        Ok(())
    }
}

/// Drives the scalar readings generator over a single shared topic.
pub struct ReadingsPublisher<T> {
    transport: T,
    topic: String,
    limit: u64,
    delay: Duration,
    assignment_num: u32,
}

impl<T: Transport> ReadingsPublisher<T> {
    /// Publisher over a single shared connection.
    pub fn new(config: &ReadingsConfig, transport: T) -> Self {
        Self {
            transport,
            topic: config.topic.clone(),
            limit: config.limit,
            delay: Duration::from_millis(config.publish_delay_ms),
            assignment_num: config.assignment_num,
        }
    }

    /// Consume the sequence in order, one publish and one delay per
    /// sample. Transport errors propagate immediately.
    pub async fn run(&mut self) -> Result<PublishStats> {
        let mut stats = PublishStats::default();

        for value in ScalarSequence::new(self.limit) {
            let reading = Reading::from_value(value);
            let payload =
                serde_json::to_string(&ReadingPayload::new(reading, self.assignment_num))?;

            info!(topic = %self.topic, %payload, "Publishing");
            self.transport.publish(&self.topic, payload).await?;
            stats.publish_count += 1;
            stats.rounds_completed += 1;

            sleep(self.delay).await;
        }

        Ok(stats)
    }

    /// Disconnect if the connection is still up.
    pub async fn shutdown(&self) -> Result<()> {
        if self.transport.is_connected() {
            info!("Disconnecting");
            self.transport.disconnect().await?;
        }
        Ok(())
    }
}

/// Publish a single hello envelope to [`HELLO_TOPIC`] as a broker smoke
/// test.
pub async fn publish_hello<T: Transport>(transport: &T, assignment_num: u32) -> Result<()> {
    let payload = serde_json::to_string(&HelloPayload::new(assignment_num))?;
    info!(topic = HELLO_TOPIC, %payload, "Publishing");
    transport.publish(HELLO_TOPIC, payload).await
}
