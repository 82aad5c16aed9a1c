//! Common DTOs used across the API

use serde::Serialize;

/// Standard API response envelope
///
/// Successful responses carry `data`; failures carry `message` and, for
/// the dashboard, an `error` field repeating it.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded
    pub success: bool,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Response message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope with `message`
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Failure envelope with `message` and the same text in `error`
    pub fn failure_with_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            error: Some(message.clone()),
            ..Self::failure(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_response() {
        let resp = ApiResponse::success("test");
        assert!(resp.success);
        assert_eq!(resp.data, Some("test"));
        assert!(resp.message.is_none());
        assert!(resp.error.is_none());
    }

    #[test]
    fn test_failure_envelope_has_no_data_key() {
        let body = serde_json::to_value(ApiResponse::failure("Invalid export type")).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "message": "Invalid export type"})
        );

        let body = serde_json::to_value(ApiResponse::failure_with_error("connection lost")).unwrap();
        assert_eq!(body["error"], "connection lost");
        assert_eq!(body["message"], "connection lost");
        assert!(body.get("data").is_none());
    }
}
