use rumqttc::{AsyncClient, Event, MqttOptions, Outgoing, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::MqttConfig;
use crate::error::Result;

/// Publish-side transport contract consumed by the publisher loop.
///
/// Lifecycle callbacks of the underlying client are logging hooks only;
/// the only state fed back into the core is the connected flag.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Deliver one payload to a topic. Failures propagate to the caller,
    /// which does not branch on them.
    async fn publish(&self, topic: &str, payload: String) -> Result<()>;

    /// Whether the connection is still up.
    fn is_connected(&self) -> bool;

    /// Close the connection.
    async fn disconnect(&self) -> Result<()>;
}

/// MQTT transport backed by a rumqttc [`AsyncClient`].
///
/// The event loop is polled by a background task which logs broker events
/// and maintains the connected flag. Lost connections are not retried.
pub struct MqttTransport {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
}

impl MqttTransport {
    /// Connect to the broker and complete the handshake. A refused or
    /// unreachable broker fails here rather than mid-loop.
    pub async fn connect(config: &MqttConfig, client_id: &str) -> Result<Self> {
        let mut options = MqttOptions::new(client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 32);

        // Drive the event loop until the broker acknowledges the session.
        loop {
            match eventloop.poll().await? {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    info!(client_id, code = ?ack.code, "Connected to broker");
                    break;
                }
                event => debug!(client_id, ?event, "Handshake event"),
            }
        }

        let connected = Arc::new(AtomicBool::new(true));
        let flag = connected.clone();
        let id = client_id.to_string();

        tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Publish(_))) => {
                        debug!(client_id = %id, "Publish handed to broker");
                    }
                    Ok(Event::Incoming(Packet::PubAck(ack))) => {
                        debug!(client_id = %id, pkid = ack.pkid, "Publish acknowledged");
                    }
                    Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                        info!(client_id = %id, "Disconnected");
                        flag.store(false, Ordering::SeqCst);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(client_id = %id, error = %e, "Connection lost");
                        flag.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }
        });

        Ok(Self { client, connected })
    }
}

impl Transport for MqttTransport {
    async fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> Result<()> {
        self.client.disconnect().await?;
        Ok(())
    }
}
