//! Console route handler
//! One handler serves every entry of the route table.

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde_json::Value;

use crate::error::GatewayError;
use crate::proxy::backend::echo_body;
use crate::proxy::routes::{render_upstream_path, RouteSpec, Target};
use crate::proxy::server::AppState;
use crate::proxy::upstream::UpstreamRequest;

/// Handle a request matched to `route`
pub async fn dispatch(
    route: &'static RouteSpec,
    state: AppState,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Bytes,
) -> Response {
    match handle(route, &state, params, query, body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!("{} {} -> {}", route.method.as_str(), route.path, err);
            err.into_response()
        }
    }
}

async fn handle(
    route: &'static RouteSpec,
    state: &AppState,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body = if route.method.has_body() {
        Some(parse_json_body(&body)?)
    } else {
        None
    };

    match route.target {
        Target::Echo(message) => {
            tracing::info!("{} {}: {}", route.method.as_str(), route.path, message);
            Ok((StatusCode::OK, Json(echo_body(message, body))).into_response())
        }
        Target::Upstream(template) => {
            let settings = &state.settings;
            let request = UpstreamRequest {
                method: route.method.as_reqwest(),
                path: render_upstream_path(template, &params)?,
                query,
                body,
                timeout: settings.timeout(route.group.timeout_class()),
                user_agent: settings.user_agent(route.group.user_agent_suffix()),
            };
            let reply = state.backend.call(request).await?;
            Ok(reply.into_response())
        }
    }
}

/// Write routes need a JSON document; an empty or malformed body is a 400.
fn parse_json_body(body: &Bytes) -> Result<Value, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::InvalidBody("expected a JSON request body".into()));
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_rejected() {
        let err = parse_json_body(&Bytes::from_static(b"  ")).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(parse_json_body(&Bytes::from_static(b"{\"servers\": [1,")).is_err());
    }

    #[test]
    fn any_json_document_is_accepted() {
        let value = parse_json_body(&Bytes::from_static(b"[1, 2, 3]")).unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }
}
