use serde::Serialize;
use serde_json::{json, Value};

/// Status code plus JSON body, independent of the transport serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    pub fn message(message: &str) -> Self {
        Self {
            status: 200,
            body: json!({ "message": message }),
        }
    }

    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::error(500, &e.to_string()),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_string(&self) -> String {
        self.body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape() {
        let response = HandlerResponse::error(400, "Invalid range parameter");
        assert_eq!(response.status, 400);
        assert_eq!(
            response.body_string(),
            r#"{"error":"Invalid range parameter"}"#
        );
        assert!(!response.is_success());
    }

    #[test]
    fn test_message_shape() {
        let response = HandlerResponse::message("Data saved successfully!");
        assert!(response.is_success());
        assert_eq!(response.body["message"], "Data saved successfully!");
    }
}
