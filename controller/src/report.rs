use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Averaged water level sent upstream once per send window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLevelReport {
    pub device_id: i64,
    pub water_level: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl WaterLevelReport {
    pub fn new(device_id: i64, water_level: i64) -> Self {
        Self {
            device_id,
            water_level,
            timestamp: None,
        }
    }

    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.timestamp = Some(now);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_body_has_no_timestamp() {
        let json = serde_json::to_string(&WaterLevelReport::new(1, 512)).unwrap();
        assert_eq!(json, r#"{"device_id":1,"water_level":512}"#);
    }

    #[test]
    fn test_broker_body_has_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_value(WaterLevelReport::new(1, 512).stamped(now)).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T10:00:00Z");
    }
}
