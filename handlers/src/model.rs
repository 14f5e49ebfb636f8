use chrono::{DateTime, Utc};
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// One water-level measurement as written by the ingest handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub device_id: i64,
    pub timestamp: String,
    pub water_level: i64,
}

impl Reading {
    pub fn new(device_id: i64, water_level: i64, now: DateTime<Utc>) -> Self {
        Self {
            device_id,
            timestamp: iso_timestamp(now),
            water_level,
        }
    }
}

/// A reading as it comes back from the store, numbers still in decimal text form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReading {
    pub device_id: StoredNumber,
    pub timestamp: String,
    pub water_level: StoredNumber,
}

impl From<&Reading> for StoredReading {
    fn from(reading: &Reading) -> Self {
        Self {
            device_id: StoredNumber::from(reading.device_id),
            timestamp: reading.timestamp.clone(),
            water_level: StoredNumber::from(reading.water_level),
        }
    }
}

/// Arbitrary-precision decimal as held by the store.
///
/// Serializes to the narrowest lossless JSON number: an integer when the
/// value is whole, a float otherwise. The decimal text itself never reaches
/// a response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNumber(String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Int(i64),
    Float(f64),
}

impl StoredNumber {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<Numeric> {
        let text = self.0.trim();
        if let Ok(value) = text.parse::<i64>() {
            return Some(Numeric::Int(value));
        }

        let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
        if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
            Some(Numeric::Int(value as i64))
        } else {
            Some(Numeric::Float(value))
        }
    }

    /// Integer value, if the decimal is whole.
    pub fn as_i64(&self) -> Option<i64> {
        match self.numeric()? {
            Numeric::Int(value) => Some(value),
            Numeric::Float(_) => None,
        }
    }
}

impl From<i64> for StoredNumber {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for StoredNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.numeric() {
            Some(Numeric::Int(value)) => serializer.serialize_i64(value),
            Some(Numeric::Float(value)) => serializer.serialize_f64(value),
            None => Err(S::Error::custom(format!(
                "stored value {:?} is not a number",
                self.0
            ))),
        }
    }
}

/// Formats `now` the way a naive UTC `isoformat()` does: no offset suffix,
/// and the microsecond fraction only when it is non-zero.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    let seconds = now.format("%Y-%m-%dT%H:%M:%S");
    match now.timestamp_subsec_micros() {
        0 => seconds.to_string(),
        micros => format!("{}.{:06}", seconds, micros),
    }
}

/// Success body of the query handler.
#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub data: Vec<StoredReading>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_whole_decimal_serializes_as_integer() {
        let value = serde_json::to_value(StoredNumber::new("120")).unwrap();
        assert_eq!(value, serde_json::json!(120));
        assert!(value.is_i64());

        let value = serde_json::to_value(StoredNumber::new("120.0")).unwrap();
        assert!(value.is_i64());
        assert_eq!(value.as_i64(), Some(120));
    }

    #[test]
    fn test_fractional_decimal_serializes_as_float() {
        let value = serde_json::to_value(StoredNumber::new("120.5")).unwrap();
        assert!(value.is_f64());
        assert_eq!(value.as_f64(), Some(120.5));
    }

    #[test]
    fn test_non_numeric_stored_value_fails_to_serialize() {
        assert!(serde_json::to_value(StoredNumber::new("abc")).is_err());
        assert!(serde_json::to_value(StoredNumber::new("NaN")).is_err());
    }

    #[test]
    fn test_stored_reading_body_has_plain_numbers() {
        let stored = StoredReading {
            device_id: StoredNumber::new("7"),
            timestamp: "2024-05-01T10:00:00".to_string(),
            water_level: StoredNumber::new("120.5"),
        };

        let json = serde_json::to_string(&stored).unwrap();
        assert_eq!(
            json,
            r#"{"device_id":7,"timestamp":"2024-05-01T10:00:00","water_level":120.5}"#
        );
    }

    #[test]
    fn test_iso_timestamp_with_micros() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 15).unwrap()
            + chrono::Duration::microseconds(42);
        assert_eq!(iso_timestamp(now), "2024-05-01T10:30:15.000042");
    }

    #[test]
    fn test_iso_timestamp_without_micros() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 15).unwrap();
        assert_eq!(iso_timestamp(now), "2024-05-01T10:30:15");
    }

    #[test]
    fn test_reading_new_stamps_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let reading = Reading::new(3, 42, now);
        assert_eq!(reading.device_id, 3);
        assert_eq!(reading.water_level, 42);
        assert_eq!(reading.timestamp, "2024-01-02T03:04:05");
    }
}
