use crate::errors::{Error, Result};
use crate::metrics::{QUERIES_TOTAL, QUERY_FAILURES_TOTAL, QUERY_LATENCY_SECONDS};
use crate::model::{iso_timestamp, ReadingsResponse, StoredReading};
use crate::range::TimeRange;
use crate::response::HandlerResponse;
use crate::store::{ReadingStore, ScanFilter};
use crate::validate::parse_int;
use chrono::{DateTime, Utc};
use prometheus::Counter;
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Query string accepted by the query handler.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryParams {
    pub device_id: Option<String>,
    pub range: Option<String>,
}

impl QueryParams {
    /// Builds params from raw query pairs; the first value of a key wins.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "device_id" => &mut params.device_id,
                "range" => &mut params.range,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into());
            }
        }
        params
    }

    pub fn new(device_id: impl Into<String>, range: Option<&str>) -> Self {
        Self {
            device_id: Some(device_id.into()),
            range: range.map(str::to_string),
        }
    }
}

/// Returns the readings of one device inside a named lookback window.
///
/// An unknown range answers 400; every other failure answers 500.
pub async fn get_readings(
    store: &dyn ReadingStore,
    params: &QueryParams,
    now: DateTime<Utc>,
) -> HandlerResponse {
    let timer = QUERY_LATENCY_SECONDS.start_timer();

    let response = match query(store, params, now).await {
        Ok(readings) => HandlerResponse::ok(&ReadingsResponse { data: readings }),
        Err(Error::InvalidRange(token)) => {
            warn!("Rejected query with range {:?}", token);
            HandlerResponse::error(400, "Invalid range parameter")
        }
        Err(e) => {
            error!("Query failed: {}", e);
            HandlerResponse::error(500, &e.to_string())
        }
    };

    outcome_counter(&response).inc();
    timer.observe_duration();
    response
}

/// Serialization can still turn a successful scan into a 500.
fn outcome_counter(response: &HandlerResponse) -> &'static Counter {
    if response.is_success() {
        &*QUERIES_TOTAL
    } else {
        &*QUERY_FAILURES_TOTAL
    }
}

async fn query(
    store: &dyn ReadingStore,
    params: &QueryParams,
    now: DateTime<Utc>,
) -> Result<Vec<StoredReading>> {
    let filter = build_filter(params, now)?;
    debug!(
        "Scanning device {} since {}",
        filter.device_id, filter.since
    );
    store.scan(&filter).await
}

/// Turns query parameters into a scan filter.
///
/// `device_id` is checked before `range`, so a request missing both fails
/// on the device.
pub fn build_filter(params: &QueryParams, now: DateTime<Utc>) -> Result<ScanFilter> {
    let device_id = params
        .device_id
        .as_deref()
        .ok_or_else(|| Error::Validation("device_id is required".to_string()))
        .and_then(|raw| parse_int("device_id", raw))?;

    let range = match params.range.as_deref() {
        Some(token) => token.parse::<TimeRange>()?,
        None => TimeRange::default(),
    };

    Ok(ScanFilter::new(
        device_id,
        iso_timestamp(range.lower_bound(now)),
    ))
}
