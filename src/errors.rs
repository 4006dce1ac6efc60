//! Errors returned by the analysis endpoints and how they map onto HTTP responses
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The caller sent something we can't work with. Never reaches the completion service.
    #[error("{0}")]
    InvalidRequest(String),

    /// The completion service could not be reached or answered with a non-success status.
    #[error("completion service error: {0}")]
    Upstream(String),

    #[error("completion service did not respond within {0} seconds")]
    Timeout(u64),

    /// The completion service answered, but not with anything usable.
    #[error("invalid completion: {message}")]
    InvalidCompletion {
        message: String,
        raw_response: Option<String>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn invalid_completion(message: impl Into<String>) -> Self {
        Self::InvalidCompletion {
            message: message.into(),
            raw_response: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) | Self::InvalidCompletion { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Upstream(_) => "upstream_error",
            Self::Timeout(_) => "upstream_timeout",
            Self::InvalidCompletion { .. } => "invalid_completion",
            Self::Internal(_) => "server_error",
        }
    }
}

impl From<JsonRejection> for AnalysisError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(e) => format!("Invalid JSON: {}", e.body_text()),
            JsonRejection::JsonSyntaxError(e) => format!("JSON syntax error: {}", e.body_text()),
            JsonRejection::MissingJsonContentType(_) => {
                "Content-Type must be application/json".to_string()
            }
            JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
            _ => "Invalid request".to_string(),
        };
        Self::InvalidRequest(message)
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_client_error() {
            warn!(error = %self, "Rejected request");
        } else {
            error!(error = %self, "Analysis failed");
        }

        let mut body = json!({
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });
        if let Self::InvalidCompletion {
            raw_response: Some(raw),
            ..
        } = self
        {
            body["raw_response"] = serde_json::Value::String(raw);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AnalysisError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalysisError::Upstream("x".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AnalysisError::Timeout(5).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AnalysisError::invalid_completion("x").status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AnalysisError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_raw_response_included_in_body() {
        let err = AnalysisError::InvalidCompletion {
            message: "not json".into(),
            raw_response: Some("here you go: {oops".into()),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["type"], "invalid_completion");
        assert_eq!(body["raw_response"], "here you go: {oops");
    }
}
