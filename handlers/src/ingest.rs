use crate::errors::{Error, Result};
use crate::metrics::{INGEST_FAILURES_TOTAL, READINGS_SAVED_TOTAL};
use crate::model::Reading;
use crate::response::HandlerResponse;
use crate::store::ReadingStore;
use crate::validate::required_int;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info};

pub const SAVED_MESSAGE: &str = "Data saved successfully!";

/// Saves one reading from a JSON request body.
///
/// Every failure, bad input or store error alike, answers 500.
pub async fn save_reading(
    store: &dyn ReadingStore,
    body: &[u8],
    now: DateTime<Utc>,
) -> HandlerResponse {
    match save(store, body, now).await {
        Ok(reading) => {
            READINGS_SAVED_TOTAL.inc();
            info!(
                "Saved reading device_id={} water_level={} at {}",
                reading.device_id, reading.water_level, reading.timestamp
            );
            HandlerResponse::message(SAVED_MESSAGE)
        }
        Err(e) => {
            INGEST_FAILURES_TOTAL.inc();
            error!("Failed to save reading: {}", e);
            HandlerResponse::error(500, &e.to_string())
        }
    }
}

async fn save(store: &dyn ReadingStore, body: &[u8], now: DateTime<Utc>) -> Result<Reading> {
    let reading = parse_reading(body, now)?;
    store.put(&reading).await?;
    Ok(reading)
}

/// Parses and coerces a request body into a timestamped reading.
pub fn parse_reading(body: &[u8], now: DateTime<Utc>) -> Result<Reading> {
    if body.is_empty() {
        return Err(Error::Validation("request body is empty".to_string()));
    }

    let payload: Value = serde_json::from_slice(body)?;
    debug!("Ingest payload: {}", payload);

    let object = payload
        .as_object()
        .ok_or_else(|| Error::Validation("request body must be a JSON object".to_string()))?;

    let device_id = required_int(object, "device_id")?;
    let water_level = required_int(object, "water_level")?;

    Ok(Reading::new(device_id, water_level, now))
}
