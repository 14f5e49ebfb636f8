use crate::report::WaterLevelReport;
use anyhow::{Context, Result};
use chrono::Utc;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tracing::{error, info};

/// Destination of averaged reports.
pub enum Uploader {
    /// POST straight to the ingest endpoint.
    Http { client: reqwest::Client, url: String },
    /// Publish to the broker topic the bridge listens on.
    Mqtt { client: AsyncClient, topic: String },
}

impl Uploader {
    pub fn http(url: String) -> Self {
        Uploader::Http {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Connects to the broker and spawns its event loop.
    pub fn mqtt(client_id: String, broker: String, port: u16, topic: String) -> Self {
        let mut mqtt_options = MqttOptions::new(client_id, broker, port);
        mqtt_options.set_keep_alive(Duration::from_secs(30));
        mqtt_options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(mqtt_options, 100);

        tokio::spawn(async move {
            loop {
                if let Err(e) = eventloop.poll().await {
                    error!("MQTT eventloop error: {}", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });

        Uploader::Mqtt { client, topic }
    }

    pub async fn upload(&self, report: WaterLevelReport) -> Result<()> {
        match self {
            Uploader::Http { client, url } => {
                let response = client
                    .post(url)
                    .json(&report)
                    .send()
                    .await
                    .context("upload request failed")?;
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                info!("Upload complete: {} - {}", status, body);
                Ok(())
            }
            Uploader::Mqtt { client, topic } => {
                let payload = serde_json::to_string(&report.stamped(Utc::now()))?;
                info!("Sending to {}: {}", topic, payload);
                client
                    .publish(topic.as_str(), QoS::AtLeastOnce, false, payload)
                    .await
                    .context("publish failed")?;
                Ok(())
            }
        }
    }
}
