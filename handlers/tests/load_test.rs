use chrono::Utc;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[derive(Debug, Serialize)]
struct SensorMessage {
    device_id: i64,
    water_level: i64,
    timestamp: String,
}

impl SensorMessage {
    fn random(device_id: i64) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Self {
            device_id,
            water_level: rng.gen_range(0..1024),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Requires a broker on localhost:1883 and a running `handlers` server.
#[tokio::test]
#[ignore]
async fn test_bridge_sustains_100_messages_per_second() {
    println!("\nStarting bridge load test: 100 msg/s");

    let test_duration_secs = 10;
    let target_rate = 100;
    let total_messages = test_duration_secs * target_rate;

    let mut mqtt_options = MqttOptions::new("bridge-load-test", "localhost", 1883);
    mqtt_options.set_keep_alive(Duration::from_secs(30));

    let (client, mut eventloop) = AsyncClient::new(mqtt_options, 2000);

    tokio::spawn(async move {
        loop {
            if let Err(e) = eventloop.poll().await {
                eprintln!("MQTT error: {}", e);
                break;
            }
        }
    });

    sleep(Duration::from_millis(500)).await;

    let start = Instant::now();
    let mut sent_count = 0;
    let mut error_count = 0;

    let burst_size = 10;
    let delay_per_burst = Duration::from_micros((burst_size * 1_000_000) / target_rate as u64);

    for batch_start in (0..total_messages).step_by(burst_size as usize) {
        for i in batch_start..std::cmp::min(batch_start + burst_size as i64, total_messages) {
            let message = SensorMessage::random(i % 10);
            let payload = serde_json::to_string(&message).unwrap();

            match client
                .publish("sensor-data", QoS::AtLeastOnce, false, payload)
                .await
            {
                Ok(_) => sent_count += 1,
                Err(e) => {
                    error_count += 1;
                    if error_count < 10 {
                        eprintln!("Send error: {}", e);
                    }
                }
            }
        }

        sleep(delay_per_burst).await;
    }

    let duration = start.elapsed();
    let actual_rate = sent_count as f64 / duration.as_secs_f64();

    println!("  Total Sent:  {}", sent_count);
    println!("  Errors:      {}", error_count);
    println!("  Duration:    {:.2}s", duration.as_secs_f64());
    println!("  Actual Rate: {:.2} msg/s", actual_rate);

    assert!(
        actual_rate >= 90.0,
        "Throughput too low: {:.2} msg/s (expected >= 90)",
        actual_rate
    );
    assert_eq!(error_count, 0, "Too many errors: {}", error_count);
}
