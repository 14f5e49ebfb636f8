use crate::errors::{Error, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_TABLE_NAME: &str = "WaterLevelTable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    DynamoDb,
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "dynamodb" => Ok(StoreBackend::DynamoDb),
            other => Err(Error::Config(format!(
                "unknown STORE_BACKEND {:?}, expected memory or dynamodb",
                other
            ))),
        }
    }
}

/// Settings of the local API server, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    pub store_backend: StoreBackend,
    pub http_addr: String,
    pub mqtt_enabled: bool,
    pub mqtt_broker: String,
    pub mqtt_port: u16,
    pub mqtt_topic: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let store_backend = get("STORE_BACKEND", "memory").parse()?;
        let mqtt_port = get("MQTT_PORT", "1883")
            .parse()
            .map_err(|e| Error::Config(format!("invalid MQTT_PORT: {}", e)))?;
        let mqtt_enabled = !matches!(
            get("MQTT_ENABLED", "true").to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        );

        Ok(Self {
            table_name: get("TABLE_NAME", DEFAULT_TABLE_NAME),
            store_backend,
            http_addr: get("HTTP_ADDR", "0.0.0.0:8080"),
            mqtt_enabled,
            mqtt_broker: get("MQTT_BROKER", "localhost"),
            mqtt_port,
            mqtt_topic: get("MQTT_TOPIC", "sensor-data"),
        })
    }

    /// Table name for the Lambda binaries, which read nothing else.
    pub fn table_name_from_env() -> String {
        env::var("TABLE_NAME").unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.table_name, "WaterLevelTable");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert!(config.mqtt_enabled);
        assert_eq!(config.mqtt_port, 1883);
        assert_eq!(config.mqtt_topic, "sensor-data");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STORE_BACKEND", "DynamoDB"),
            ("MQTT_ENABLED", "false"),
            ("MQTT_PORT", "1884"),
            ("TABLE_NAME", "Readings"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::DynamoDb);
        assert!(!config.mqtt_enabled);
        assert_eq!(config.mqtt_port, 1884);
        assert_eq!(config.table_name, "Readings");
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("STORE_BACKEND", "postgres")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MQTT_PORT", "not-a-port")])).is_err());
    }
}
