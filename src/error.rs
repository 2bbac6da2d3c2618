use serde::{ser::Serializer, Deserialize, Serialize};
use thiserror::Error;

/// A specialized `Result` type for the Telegram HTTP API crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the Telegram HTTP API crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {0}")]
    Api(ApiError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Broadcast error: {0}")]
    Broadcast(String),
}

impl Error {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns the API error detail if this error came from the remote endpoint.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Fallback description when the API reports a failure without one.
pub const UNKNOWN_API_ERROR: &str = "Unknown error from API Response.";

/// Failure reported by the Bot API in an `"ok": false` body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    /// `error_code` from the body, or the HTTP status when the body has none.
    pub error_code: Option<i64>,
    pub description: String,
    pub parameters: Option<ResponseParameters>,
}

/// Hints attached to some failures (group migrated, flood control).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<i64>,
}

impl ApiError {
    /// Builds the error from a decoded failure body.
    pub fn from_body(body: &serde_json::Value, http_status: Option<u16>) -> Self {
        let error_code = body
            .get("error_code")
            .and_then(|v| v.as_i64())
            .or_else(|| http_status.map(i64::from));
        let description = body
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or(UNKNOWN_API_ERROR)
            .to_string();
        let parameters = body
            .get("parameters")
            .and_then(|v| serde_json::from_value(v.clone()).ok());
        Self {
            error_code,
            description,
            parameters,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error_code {
            Some(code) => write!(f, "{} - {}", code, self.description),
            None => write!(f, "{}", self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_error_reads_code_and_description() {
        let body = json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        });
        let err = ApiError::from_body(&body, Some(200));
        assert_eq!(err.error_code, Some(400));
        assert_eq!(err.description, "Bad Request: chat not found");
        assert!(err.parameters.is_none());
    }

    #[test]
    fn api_error_falls_back_to_http_status_and_default_description() {
        let err = ApiError::from_body(&json!({ "ok": false }), Some(502));
        assert_eq!(err.error_code, Some(502));
        assert_eq!(err.description, UNKNOWN_API_ERROR);
    }

    #[test]
    fn api_error_keeps_retry_hint() {
        let body = json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 5",
            "parameters": { "retry_after": 5 }
        });
        let err = ApiError::from_body(&body, None);
        assert_eq!(
            err.parameters,
            Some(ResponseParameters {
                migrate_to_chat_id: None,
                retry_after: Some(5),
            })
        );
    }

    #[test]
    fn error_display_messages() {
        let err = Error::Api(ApiError {
            error_code: Some(401),
            description: "Unauthorized".into(),
            parameters: None,
        });
        assert_eq!(err.to_string(), "API error: 401 - Unauthorized");
        assert!(err.api_error().is_some());

        let err = Error::invalid_argument("bad event");
        assert_eq!(err.to_string(), "Invalid argument: bad event");
        assert_eq!(serde_json::to_value(&err).unwrap(), json!("Invalid argument: bad event"));
    }
}
