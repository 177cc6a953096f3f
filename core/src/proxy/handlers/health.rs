//! Health and fallback handlers

use std::any::Any;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::not_found_body;
use crate::proxy::server::AppState;

pub const SERVICE_NAME: &str = "miniultimax-console";

/// Health check handler
pub async fn health_check_handler(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "mode": state.backend.mode().as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

pub async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(not_found_body())).into_response()
}

pub const PANIC_MESSAGE: &str = "An unexpected error occurred";

/// Turn a handler panic into the JSON 500 envelope. The payload is logged,
/// never sent to the client.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };
    tracing::error!("Handler panicked: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "message": PANIC_MESSAGE,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panic_payload_is_not_leaked() {
        let response = panic_response(Box::new(String::from("db password is hunter2")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["message"], PANIC_MESSAGE);
        assert!(!body.to_string().contains("hunter2"));
    }
}
