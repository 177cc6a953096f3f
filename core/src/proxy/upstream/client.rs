//! Upstream client for calling the game server API

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use reqwest::{header, Client, Method, Response};
use serde_json::Value;

use crate::error::GatewayError;
use crate::proxy::backend::Reply;
use crate::proxy::config::ProxySettings;

/// One outbound call, already mapped to the upstream path
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    /// Upstream-relative path, e.g. `servers/3/metrics`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Clone)]
pub struct UpstreamClient {
    http_client: Client,
    settings: Arc<ProxySettings>,
}

impl UpstreamClient {
    pub fn new(settings: Arc<ProxySettings>) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client, settings })
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    fn headers(&self, user_agent: &str) -> Result<header::HeaderMap, GatewayError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(user_agent)
                .map_err(|e| GatewayError::Config(e.to_string()))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(key) = self.settings.api_key() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| GatewayError::Config(e.to_string()))?,
            );
        }
        Ok(headers)
    }

    /// Single best-effort call; no retries.
    pub async fn forward(&self, request: UpstreamRequest) -> Result<Reply, GatewayError> {
        let url = self.settings.upstream_url(&request.path);
        let headers = self.headers(&request.user_agent)?;

        tracing::debug!("Forwarding {} {} (timeout {:?})", request.method, url, request.timeout);

        let mut builder = self
            .http_client
            .request(request.method.clone(), &url)
            .headers(headers)
            .timeout(request.timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Upstream {} {} failed: {}", request.method, url, e);
            GatewayError::UpstreamTransport(describe_transport_error(&e))
        })?;

        translate_response(response, self.settings.max_response_bytes()).await
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timed out: {}", err)
    } else {
        err.to_string()
    }
}

/// Read the whole body, refusing anything over `limit` bytes
async fn read_body(mut response: Response, limit: usize) -> Result<Bytes, GatewayError> {
    let too_large = || GatewayError::InvalidUpstreamBody(format!("response body exceeds {} bytes", limit));

    if response.content_length().is_some_and(|len| len > limit as u64) {
        return Err(too_large());
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| GatewayError::UpstreamTransport(describe_transport_error(&e)))?
    {
        if body.len() + chunk.len() > limit {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// 2xx bodies pass through untouched (after a JSON check); anything else
/// becomes an error carrying the raw upstream text.
async fn translate_response(response: Response, limit: usize) -> Result<Reply, GatewayError> {
    let status = response.status();
    let body = read_body(response, limit).await?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body).into_owned();
        let preview: String = text.chars().take(200).collect();
        tracing::warn!("Upstream returned {}: {}", status, preview);
        return Err(GatewayError::UpstreamStatus {
            status: status.as_u16(),
            body: text,
        });
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Reply::empty(status.as_u16()));
    }

    serde_json::from_slice::<serde::de::IgnoredAny>(&body)
        .map_err(|e| GatewayError::InvalidUpstreamBody(e.to_string()))?;

    Ok(Reply::raw_json(status.as_u16(), body))
}
