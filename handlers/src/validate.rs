use crate::errors::{Error, Result};
use serde_json::{Map, Value};

/// Coerces a loosely typed JSON value to an integer.
///
/// Integers pass through, floats truncate toward zero, strings are trimmed
/// and parsed base-10. Everything else is rejected.
pub fn coerce_int(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(int)
            } else if let Some(float) = number.as_f64() {
                truncate(field, float)
            } else {
                Err(Error::Validation(format!(
                    "{} value {} is out of range",
                    field, number
                )))
            }
        }
        Value::String(text) => parse_int(field, text),
        other => Err(Error::Validation(format!(
            "{} must be an integer, got {}",
            field, other
        ))),
    }
}

/// Parses a query-string style integer.
pub fn parse_int(field: &str, text: &str) -> Result<i64> {
    text.trim().parse::<i64>().map_err(|_| {
        Error::Validation(format!(
            "invalid literal for {} with base 10: {:?}",
            field, text
        ))
    })
}

/// Fetches a required field from a JSON object and coerces it.
pub fn required_int(object: &Map<String, Value>, field: &str) -> Result<i64> {
    let value = object
        .get(field)
        .ok_or_else(|| Error::Validation(format!("missing field '{}'", field)))?;
    coerce_int(field, value)
}

fn truncate(field: &str, value: f64) -> Result<i64> {
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(Error::Validation(format!(
            "{} value {} is out of range",
            field, value
        )));
    }
    Ok(value.trunc() as i64)
}
