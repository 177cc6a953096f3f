//! Gateway error types and their JSON rendering

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

pub const UPSTREAM_CONNECT_ERROR: &str = "Failed to connect to game server";
pub const UPSTREAM_STATUS_ERROR: &str = "Game server returned an error";
pub const UPSTREAM_BODY_ERROR: &str = "Invalid response from game server";
pub const NOT_FOUND_ERROR: &str = "Not found";
pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// DNS, connect, timeout or any other failure before a status arrived
    #[error("Failed to connect to game server: {0}")]
    UpstreamTransport(String),

    #[error("Game server returned HTTP {status}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid response from game server: {0}")]
    InvalidUpstreamBody(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Resource not found: {0}")]
    RouteNotFound(String),

    #[error("Not available in fixture mode: {0}")]
    Unsupported(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamTransport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::InvalidUpstreamBody(_) => StatusCode::BAD_GATEWAY,
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `(error, message)` pair for the client-facing envelope
    fn envelope(&self) -> (&'static str, String) {
        match self {
            GatewayError::UpstreamTransport(reason) => (UPSTREAM_CONNECT_ERROR, reason.clone()),
            GatewayError::UpstreamStatus { body, .. } => (UPSTREAM_STATUS_ERROR, body.clone()),
            GatewayError::InvalidUpstreamBody(reason) => (UPSTREAM_BODY_ERROR, reason.clone()),
            GatewayError::InvalidBody(reason) => ("Invalid request body", reason.clone()),
            GatewayError::PayloadTooLarge(reason) => ("Request body too large", reason.clone()),
            GatewayError::RouteNotFound(_) => (NOT_FOUND_ERROR, NOT_FOUND_MESSAGE.to_string()),
            GatewayError::Unsupported(path) => ("Not available in fixture mode", path.clone()),
            GatewayError::Config(reason) => ("Internal server error", reason.clone()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error, message) = self.envelope();
        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge(rejection.body_text())
        } else {
            GatewayError::InvalidBody(rejection.body_text())
        }
    }
}

/// JSON body used for unknown routes
pub fn not_found_body() -> serde_json::Value {
    json!({ "error": NOT_FOUND_ERROR, "message": NOT_FOUND_MESSAGE })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn transport_error_is_500_with_fixed_message() {
        let response = GatewayError::UpstreamTransport("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to connect to game server");
        assert_eq!(body["message"], "connection refused");
    }

    #[tokio::test]
    async fn upstream_status_is_relayed_with_raw_text() {
        let response = GatewayError::UpstreamStatus {
            status: 404,
            body: "no such server".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "no such server");
    }

    #[test]
    fn out_of_range_upstream_status_maps_to_bad_gateway() {
        let err = GatewayError::UpstreamStatus { status: 1000, body: String::new() };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn route_not_found_uses_fixed_envelope() {
        let response = GatewayError::RouteNotFound("/nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, not_found_body());
    }
}
