use handlers::config::{Config, StoreBackend};
use handlers::db::DynamoStore;
use handlers::{metrics, mqtt, rest, MemoryStore, SharedStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    info!("Starting water level API");
    info!("Store backend: {:?}, table: {}", config.store_backend, config.table_name);
    info!("HTTP server: {}", config.http_addr);

    metrics::init_metrics()?;

    let store: SharedStore = match config.store_backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::DynamoDb => Arc::new(DynamoStore::connect(config.table_name.clone()).await),
    };

    let bridge_handle = if config.mqtt_enabled {
        info!("MQTT broker: {}:{}, topic: {}", config.mqtt_broker, config.mqtt_port, config.mqtt_topic);
        let client_id = format!("waterlevel-bridge-{}", uuid::Uuid::new_v4());
        let bridge_store = store.clone();
        let broker = config.mqtt_broker.clone();
        let topic = config.mqtt_topic.clone();
        let port = config.mqtt_port;
        Some(tokio::spawn(async move {
            if let Err(e) = mqtt::run_bridge(broker, port, client_id, topic, bridge_store).await {
                error!("MQTT bridge failed: {}", e);
            }
        }))
    } else {
        info!("MQTT bridge disabled");
        None
    };

    let app = rest::create_router(store);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!("HTTP server listening on {}", config.http_addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server error: {}", e);
        }
    });

    let bridge_finished = async {
        match bridge_handle {
            Some(handle) => {
                let _ = handle.await;
            }
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        _ = bridge_finished => {
            error!("MQTT bridge terminated");
        }
        _ = server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
    Ok(())
}
