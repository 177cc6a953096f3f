//! Route table
//!
//! Every console endpoint is one `RouteSpec`. The server registers them all
//! against the same dispatch handler; nothing else knows about paths.

use std::collections::HashMap;

use axum::routing::MethodFilter;
use reqwest::Url;

use crate::error::GatewayError;
use crate::proxy::config::TimeoutClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn filter(&self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
        }
    }

    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post)
    }
}

/// Route groups differ only in prefix, User-Agent suffix and timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGroup {
    /// `/api/*`
    Basic,
    /// `/api2/*`
    Extended,
    /// `/api3/*` batch and automation
    Automation,
}

impl RouteGroup {
    pub fn user_agent_suffix(&self) -> &'static str {
        match self {
            Self::Basic => "",
            Self::Extended => "-API2",
            Self::Automation => "-API3",
        }
    }

    pub fn timeout_class(&self) -> TimeoutClass {
        match self {
            Self::Basic | Self::Extended => TimeoutClass::Standard,
            Self::Automation => TimeoutClass::Batch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Forward to this upstream-relative path; `{name}` is filled from the
    /// inbound path parameters
    Upstream(&'static str),
    /// Answer locally, echoing the request body with this message
    Echo(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub method: HttpMethod,
    /// axum path syntax
    pub path: &'static str,
    pub target: Target,
    pub group: RouteGroup,
}

const fn route(method: HttpMethod, path: &'static str, target: Target, group: RouteGroup) -> RouteSpec {
    RouteSpec { method, path, target, group }
}

use HttpMethod::{Get, Post};
use RouteGroup::{Automation, Basic, Extended};
use Target::{Echo, Upstream};

pub static ROUTES: &[RouteSpec] = &[
    route(Get, "/api/servers", Upstream("servers"), Basic),
    route(Get, "/api/servers/:id", Upstream("servers/{id}"), Basic),
    route(Get, "/api/players", Upstream("players"), Basic),
    route(Get, "/api/players/:id", Upstream("players/{id}"), Basic),
    route(Get, "/api/commands", Upstream("commands"), Basic),
    route(Get, "/api/commands/:id", Upstream("commands/{id}"), Basic),
    route(Post, "/api/commands", Upstream("commands"), Basic),
    route(Post, "/api/send-message", Echo("Message sent successfully"), Basic),
    route(Post, "/api/execute-command", Echo("Command executed successfully"), Basic),
    route(Get, "/api2/servers/quick-status", Upstream("servers/quick-status"), Extended),
    route(Get, "/api2/players/online", Upstream("players/online"), Extended),
    route(Get, "/api2/server/:id/metrics", Upstream("servers/{id}/metrics"), Extended),
    route(Post, "/api2/command/queue", Upstream("command/queue"), Extended),
    route(Post, "/api3/batch/execute", Upstream("batch/execute"), Automation),
    route(Post, "/api3/batch/message", Upstream("batch/message"), Automation),
    route(Post, "/api3/automation/run", Upstream("automation/run"), Automation),
];

/// Fill `{name}` placeholders in an upstream path template.
///
/// Each value becomes exactly one percent-encoded segment, so a decoded `/`
/// cannot add path segments and `..` cannot climb out of the resource.
pub fn render_upstream_path(
    template: &str,
    params: &HashMap<String, String>,
) -> Result<String, GatewayError> {
    let mut url = Url::parse("http://upstream.invalid/")
        .map_err(|e| GatewayError::Config(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| GatewayError::Config("upstream path cannot be a base".to_string()))?;
        segments.clear();
        for segment in template.split('/') {
            let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                if segment.contains(['{', '}']) {
                    return Err(GatewayError::Config(format!("bad placeholder in {:?}", template)));
                }
                segments.push(segment);
                continue;
            };
            let value = params
                .get(name)
                .ok_or_else(|| GatewayError::RouteNotFound(format!("missing path parameter {}", name)))?;
            if value.is_empty() || value == "." || value == ".." {
                return Err(GatewayError::RouteNotFound(format!("invalid path parameter {}", name)));
            }
            segments.push(value);
        }
    }
    Ok(url.path().trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn renders_placeholders() {
        let path = render_upstream_path("servers/{id}/metrics", &params(&[("id", "7")])).unwrap();
        assert_eq!(path, "servers/7/metrics");
        assert_eq!(render_upstream_path("players", &HashMap::new()).unwrap(), "players");
    }

    #[test]
    fn encodes_slashes_and_spaces_in_values() {
        let path = render_upstream_path("servers/{id}", &params(&[("id", "a/b c")])).unwrap();
        assert_eq!(path, "servers/a%2Fb%20c");

        let path = render_upstream_path("servers/{id}/metrics", &params(&[("id", "a?b#c%d")])).unwrap();
        assert_eq!(path, "servers/a%3Fb%23c%25d/metrics");
    }

    #[test]
    fn dot_segments_are_rejected() {
        for value in [".", ".."] {
            assert!(matches!(
                render_upstream_path("servers/{id}", &params(&[("id", value)])),
                Err(GatewayError::RouteNotFound(_))
            ));
        }
    }

    #[test]
    fn missing_parameter_is_an_error() {
        assert!(matches!(
            render_upstream_path("servers/{id}", &HashMap::new()),
            Err(GatewayError::RouteNotFound(_))
        ));
    }

    #[test]
    fn every_upstream_placeholder_has_an_inbound_capture() {
        for spec in ROUTES {
            if let Target::Upstream(template) = spec.target {
                let captures: HashMap<String, String> = spec
                    .path
                    .split('/')
                    .filter_map(|seg| seg.strip_prefix(':'))
                    .map(|name| (name.to_string(), "1".to_string()))
                    .collect();
                assert!(
                    render_upstream_path(template, &captures).is_ok(),
                    "{} {}",
                    spec.method.as_str(),
                    spec.path
                );
            }
        }
    }

    #[test]
    fn automation_group_gets_batch_timeout() {
        for spec in ROUTES.iter().filter(|r| r.path.starts_with("/api3/")) {
            assert_eq!(spec.group.timeout_class(), TimeoutClass::Batch);
            assert_eq!(spec.group.user_agent_suffix(), "-API3");
        }
        for spec in ROUTES.iter().filter(|r| !r.path.starts_with("/api3/")) {
            assert_eq!(spec.group.timeout_class(), TimeoutClass::Standard);
        }
    }

    #[test]
    fn no_duplicate_method_and_path() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                assert!(!(a.method == b.method && a.path == b.path), "duplicate {}", a.path);
            }
        }
    }
}
