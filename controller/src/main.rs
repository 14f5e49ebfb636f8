mod report;
mod sensor;
mod upload;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::Rng;
use report::WaterLevelReport;
use sensor::{Sampler, SensorSource};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use upload::Uploader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Http,
    Mqtt,
}

/// Samples a water level sensor and uploads averaged readings.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, env = "DEVICE_ID", default_value_t = 1)]
    device_id: i64,

    /// Sensor device path, or `simulate` for generated readings.
    #[arg(long, env = "SENSOR_SOURCE", default_value = "/dev/ttyUSB0")]
    source: String,

    #[arg(long, env = "READ_INTERVAL_SECS", default_value_t = 60)]
    read_interval_secs: u64,

    #[arg(long, env = "SEND_INTERVAL_SECS", default_value_t = 300)]
    send_interval_secs: u64,

    #[arg(long, env = "UPLOAD_TARGET", value_enum, default_value_t = Target::Http)]
    target: Target,

    /// Ingest endpoint for the http target.
    #[arg(long, env = "INGEST_URL", default_value = "http://localhost:8080/readings")]
    url: String,

    #[arg(long, env = "MQTT_BROKER", default_value = "localhost")]
    mqtt_broker: String,

    #[arg(long, env = "MQTT_PORT", default_value_t = 1883)]
    mqtt_port: u16,

    #[arg(long, env = "MQTT_TOPIC", default_value = "sensor-data")]
    topic: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    info!("Starting water level controller for device {}", args.device_id);
    info!(
        "Read every {}s, send every {}s via {:?}",
        args.read_interval_secs, args.send_interval_secs, args.target
    );

    let mut source = if args.source == "simulate" {
        info!("Using simulated sensor");
        SensorSource::simulated()
    } else {
        SensorSource::open_device(PathBuf::from(&args.source)).await?
    };

    let uploader = match args.target {
        Target::Http => {
            info!("Uploading to {}", args.url);
            Uploader::http(args.url.clone())
        }
        Target::Mqtt => {
            info!("Publishing to {}:{} topic {}", args.mqtt_broker, args.mqtt_port, args.topic);
            let client_id = format!("controller-{}", rand::thread_rng().gen::<u32>());
            Uploader::mqtt(client_id, args.mqtt_broker.clone(), args.mqtt_port, args.topic.clone())
        }
    };

    let read_period = Duration::from_secs(args.read_interval_secs.max(1));
    let send_period = Duration::from_secs(args.send_interval_secs.max(1));
    let mut read_ticker = interval_at(Instant::now() + read_period, read_period);
    let mut send_ticker = interval_at(Instant::now() + send_period, send_period);

    let mut sampler = Sampler::new();

    info!("Started reading and sending, press Ctrl+C to stop");

    loop {
        tokio::select! {
            _ = read_ticker.tick() => {
                sampler.record(source.read_line().await);
            }

            _ = send_ticker.tick() => {
                let Some(water_level) = sampler.drain_average() else {
                    info!("No data to send yet");
                    continue;
                };

                info!("Uploading: device_id={}, water_level={}", args.device_id, water_level);
                let report = WaterLevelReport::new(args.device_id, water_level);
                if let Err(e) = uploader.upload(report).await {
                    warn!("Upload error: {:#}", e);
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    Ok(())
}
