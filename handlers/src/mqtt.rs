use crate::errors::{Error, Result};
use crate::ingest::save_reading;
use crate::metrics::BRIDGE_MESSAGES_TOTAL;
use crate::response::HandlerResponse;
use crate::store::SharedStore;
use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tracing::{debug, error, info, warn};

/// Forwards every message published on `topic` to the ingest handler.
pub async fn run_bridge(
    broker: String,
    port: u16,
    client_id: String,
    topic: String,
    store: SharedStore,
) -> Result<()> {
    info!("Connecting to MQTT broker at {}:{}", broker, port);

    let mut mqtt_options = MqttOptions::new(client_id, broker, port);
    mqtt_options.set_keep_alive(std::time::Duration::from_secs(30));
    mqtt_options.set_clean_session(false);

    let (client, mut eventloop) = AsyncClient::new(mqtt_options, 100);

    client
        .subscribe(topic.as_str(), QoS::AtLeastOnce)
        .await
        .map_err(Error::Mqtt)?;

    info!("Subscribed to {} with QoS 1", topic);

    loop {
        match eventloop.poll().await {
            Ok(notification) => {
                if let Event::Incoming(Packet::Publish(publish)) = notification {
                    BRIDGE_MESSAGES_TOTAL.inc();

                    debug!(
                        "Received message on topic {}, size: {} bytes",
                        publish.topic,
                        publish.payload.len()
                    );

                    forward_message(&store, &publish.payload).await;
                }
            }
            Err(e) => {
                error!("MQTT error: {}", e);
                // rumqttc reconnects on the next poll
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        }
    }
}

/// Hands one broker payload to the ingest handler and logs the outcome.
pub async fn forward_message(store: &SharedStore, payload: &[u8]) -> HandlerResponse {
    let response = save_reading(store.as_ref(), payload, Utc::now()).await;
    if response.is_success() {
        info!("Forwarded reading: {} - {}", response.status, response.body);
    } else {
        warn!(
            "Reading rejected: {} - {}",
            response.status, response.body
        );
    }
    response
}
