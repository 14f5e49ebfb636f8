use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use tracing::error;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref READINGS_SAVED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "waterlevel_readings_saved_total",
        "Total readings written to the store"
    ))
    .unwrap();
    pub static ref INGEST_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "waterlevel_ingest_failures_total",
        "Total ingest requests answered with an error"
    ))
    .unwrap();
    pub static ref QUERIES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "waterlevel_queries_total",
        "Total queries answered successfully"
    ))
    .unwrap();
    pub static ref QUERY_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "waterlevel_query_failures_total",
        "Total queries answered with an error"
    ))
    .unwrap();
    pub static ref BRIDGE_MESSAGES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "waterlevel_bridge_messages_total",
        "Total messages received from the MQTT bridge"
    ))
    .unwrap();
    pub static ref QUERY_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "waterlevel_query_latency_seconds",
            "Time taken to answer a readings query"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(READINGS_SAVED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(INGEST_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUERIES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUERY_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(BRIDGE_MESSAGES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(QUERY_LATENCY_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
