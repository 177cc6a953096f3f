//! Backends behind the route table
//!
//! The proxy backend forwards to the game server, the fixture backend answers
//! the same upstream paths from a `DataProvider`.

use std::sync::Arc;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::config::BackendMode;
use crate::error::GatewayError;
use crate::fixtures::DataProvider;
use crate::proxy::upstream::{UpstreamClient, UpstreamRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Empty,
    /// Upstream bytes already known to be valid JSON
    RawJson(Bytes),
    Json(Value),
}

/// Successful answer for the client
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: ReplyBody,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Self { status: 200, body: ReplyBody::Json(value) }
    }

    pub fn raw_json(status: u16, body: Bytes) -> Self {
        Self { status, body: ReplyBody::RawJson(body) }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: ReplyBody::Empty }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        match self.body {
            ReplyBody::Empty => status.into_response(),
            ReplyBody::RawJson(bytes) => (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            ReplyBody::Json(value) => (status, Json(value)).into_response(),
        }
    }
}

pub enum Backend {
    Proxy(UpstreamClient),
    Fixture(FixtureBackend),
}

impl Backend {
    pub fn mode(&self) -> BackendMode {
        match self {
            Backend::Proxy(_) => BackendMode::Proxy,
            Backend::Fixture(_) => BackendMode::Fixture,
        }
    }

    pub async fn call(&self, request: UpstreamRequest) -> Result<Reply, GatewayError> {
        match self {
            Backend::Proxy(client) => client.forward(request).await,
            Backend::Fixture(fixtures) => fixtures.handle(&request),
        }
    }
}

pub struct FixtureBackend {
    provider: Arc<dyn DataProvider>,
}

impl FixtureBackend {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self { provider }
    }

    pub fn handle(&self, request: &UpstreamRequest) -> Result<Reply, GatewayError> {
        let path = request.path.trim_matches('/');
        let segments: Vec<&str> = path.split('/').collect();
        let p = &self.provider;

        tracing::debug!("Fixture {} {}", request.method, path);

        let value = match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["servers"]) => json!(p.servers()),
            ("GET", ["servers", "quick-status"]) => Value::Array(
                p.servers()
                    .iter()
                    .map(|s| json!({ "id": s.id, "status": s.status }))
                    .collect(),
            ),
            ("GET", ["servers", id]) => {
                let server = parse_id(id)
                    .and_then(|id| p.server(id))
                    .ok_or_else(|| GatewayError::RouteNotFound(path.to_string()))?;
                json!(server)
            }
            ("GET", ["players"]) => json!(p.players()),
            ("GET", ["players", "online"]) => json!(p.players_with_status("online")),
            ("GET", ["players", server_id]) => {
                let id = parse_id(server_id)
                    .ok_or_else(|| GatewayError::RouteNotFound(path.to_string()))?;
                json!(p.players_on_server(id))
            }
            ("GET", ["commands"]) => json!(p.commands()),
            ("GET", ["commands", id]) => {
                let command = parse_id(id)
                    .and_then(|id| p.command(id))
                    .ok_or_else(|| GatewayError::RouteNotFound(path.to_string()))?;
                json!(command)
            }
            ("POST", ["commands"]) => {
                echo_body("Command executed successfully", request.body.clone())
            }
            _ => return Err(GatewayError::Unsupported(path.to_string())),
        };

        Ok(Reply::json(value))
    }
}

/// Ids are unsigned decimal digits only; `+1`, `-1` and `1.0` are not ids.
fn parse_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// `{status, message, data}` envelope returned by the local write endpoints
pub fn echo_body(message: &str, data: Option<Value>) -> Value {
    json!({
        "status": "success",
        "message": message,
        "data": data.unwrap_or(Value::Null),
    })
}
