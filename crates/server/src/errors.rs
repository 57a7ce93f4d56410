use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use service::errors::ServiceError;
use tracing::error;

/// JSON error response: `{"error": ..., "details"?: ..., "status"?: ...}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, details: Option<serde_json::Value>) -> Self {
        let mut body = ErrorBody::new(error);
        body.details = details;
        Self { status, body }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, body: ErrorBody::new(msg) }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Unauthorized(_) => Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", None),
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::Config(msg) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, &format!("Server misconfigured: {msg}"), None)
            }
            ServiceError::Relay { status, details } => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Self::new(status, "Upload failed", Some(details))
            }
            ServiceError::StoreUnavailable { status } => {
                let mut err = Self::new(StatusCode::BAD_GATEWAY, "Failed to fetch identifier store", None);
                err.body.status = status;
                err
            }
            ServiceError::Upstream(msg) => {
                Self::new(StatusCode::BAD_GATEWAY, "Upstream fetch failed", Some(serde_json::Value::String(msg)))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), error = %self.body.error, "request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_service_errors_to_status() {
        let cases = [
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Validation("No files provided".into()), StatusCode::BAD_REQUEST),
            (ServiceError::config("image host token"), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Relay { status: 429, details: json!({}) }, StatusCode::TOO_MANY_REQUESTS),
            (ServiceError::StoreUnavailable { status: Some(404) }, StatusCode::BAD_GATEWAY),
            (ServiceError::Upstream("timeout".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn relay_keeps_upstream_body() {
        let err = JsonApiError::from(ServiceError::Relay { status: 400, details: json!({"error": "bad"}) });
        assert_eq!(err.body.error, "Upload failed");
        assert_eq!(err.body.details, Some(json!({"error": "bad"})));
    }

    #[test]
    fn relay_with_invalid_status_becomes_bad_gateway() {
        let err = JsonApiError::from(ServiceError::Relay { status: 42, details: json!({}) });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
