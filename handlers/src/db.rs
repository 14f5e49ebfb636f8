use crate::errors::{Error, Result};
use crate::model::{Reading, StoredNumber, StoredReading};
use crate::store::{ReadingStore, ScanFilter};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::{debug, info};

const FILTER_EXPRESSION: &str = "#device_id = :device_id AND #ts >= :since";

pub async fn make_client() -> Client {
    info!("Loading AWS configuration...");
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    info!(
        "AWS configuration loaded, region: {}",
        config
            .region()
            .map(|region| region.as_ref())
            .unwrap_or("<unset>")
    );
    Client::new(&config)
}

/// DynamoDB-backed reading table.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub async fn connect(table_name: impl Into<String>) -> Self {
        Self::new(make_client().await, table_name)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ReadingStore for DynamoStore {
    async fn put(&self, reading: &Reading) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(reading_item(reading)))
            .send()
            .await
            .map_err(aws_sdk_dynamodb::Error::from)?;

        debug!(
            "Stored reading for device {} at {}",
            reading.device_id, reading.timestamp
        );
        Ok(())
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<StoredReading>> {
        let mut items = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression(FILTER_EXPRESSION)
            .expression_attribute_names("#device_id", "device_id")
            .expression_attribute_names("#ts", "timestamp")
            .expression_attribute_values(
                ":device_id",
                AttributeValue::N(filter.device_id.to_string()),
            )
            .expression_attribute_values(":since", AttributeValue::S(filter.since.clone()))
            .into_paginator()
            .items()
            .send();

        let mut readings = Vec::new();
        while let Some(item) = items.next().await {
            let item = item.map_err(aws_sdk_dynamodb::Error::from)?;
            readings.push(stored_reading(&item)?);
        }

        debug!(
            "Scan for device {} since {} matched {} items",
            filter.device_id,
            filter.since,
            readings.len()
        );
        Ok(readings)
    }
}

pub fn reading_item(reading: &Reading) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "device_id".to_string(),
            AttributeValue::N(reading.device_id.to_string()),
        ),
        (
            "timestamp".to_string(),
            AttributeValue::S(reading.timestamp.clone()),
        ),
        (
            "water_level".to_string(),
            AttributeValue::N(reading.water_level.to_string()),
        ),
    ])
}

pub fn stored_reading(item: &HashMap<String, AttributeValue>) -> Result<StoredReading> {
    Ok(StoredReading {
        device_id: number_attr(item, "device_id")?,
        timestamp: string_attr(item, "timestamp")?,
        water_level: number_attr(item, "water_level")?,
    })
}

fn number_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<StoredNumber> {
    match item.get(name) {
        Some(AttributeValue::N(text)) => Ok(StoredNumber::new(text.as_str())),
        Some(other) => Err(Error::Store(format!(
            "attribute {} is not a number: {:?}",
            name, other
        ))),
        None => Err(Error::Store(format!("item is missing attribute {}", name))),
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String> {
    match item.get(name) {
        Some(AttributeValue::S(text)) => Ok(text.clone()),
        Some(other) => Err(Error::Store(format!(
            "attribute {} is not a string: {:?}",
            name, other
        ))),
        None => Err(Error::Store(format!("item is missing attribute {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_item_layout() {
        let reading = Reading {
            device_id: 7,
            timestamp: "2024-05-01T10:00:00.123456".to_string(),
            water_level: 120,
        };

        let item = reading_item(&reading);
        assert_eq!(item.len(), 3);
        assert_eq!(item["device_id"], AttributeValue::N("7".to_string()));
        assert_eq!(
            item["timestamp"],
            AttributeValue::S("2024-05-01T10:00:00.123456".to_string())
        );
        assert_eq!(item["water_level"], AttributeValue::N("120".to_string()));
    }

    #[test]
    fn test_stored_reading_keeps_decimal_text() {
        let item = HashMap::from([
            ("device_id".to_string(), AttributeValue::N("7".to_string())),
            (
                "timestamp".to_string(),
                AttributeValue::S("2024-05-01T10:00:00".to_string()),
            ),
            (
                "water_level".to_string(),
                AttributeValue::N("120.5".to_string()),
            ),
        ]);

        let stored = stored_reading(&item).unwrap();
        assert_eq!(stored.device_id.as_str(), "7");
        assert_eq!(stored.water_level.as_str(), "120.5");
    }

    #[test]
    fn test_stored_reading_rejects_bad_items() {
        let missing = HashMap::from([(
            "device_id".to_string(),
            AttributeValue::N("7".to_string()),
        )]);
        assert!(matches!(stored_reading(&missing), Err(Error::Store(_))));

        let wrong_type = HashMap::from([
            ("device_id".to_string(), AttributeValue::S("7".to_string())),
            (
                "timestamp".to_string(),
                AttributeValue::S("2024-05-01T10:00:00".to_string()),
            ),
            ("water_level".to_string(), AttributeValue::N("1".to_string())),
        ]);
        assert!(matches!(stored_reading(&wrong_type), Err(Error::Store(_))));
    }
}
