//! Reverse proxy to the route table's upstreams
//!
//! Runs behind [`AuthorizationFilter`](crate::middleware::AuthorizationFilter), so
//! by the time a request lands here its identity headers are already settled.

use crate::error::GatewayError;
use crate::routes::{is_canonical_path, RouteTable};
use actix_web::{
    http::{header::HeaderName as ActixHeaderName, StatusCode},
    web, HttpRequest, HttpResponse,
};
use reqwest::header::{HeaderMap as UpstreamHeaders, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Connection-scoped headers that must not cross the proxy
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    routes: Arc<RouteTable>,
}

impl ProxyState {
    pub fn new(routes: Arc<RouteTable>, upstream_timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, routes })
    }
}

/// Default service: relay the request to its upstream and the answer back
pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<ProxyState>,
) -> Result<HttpResponse, GatewayError> {
    if !is_canonical_path(req.path()) {
        return Err(GatewayError::InvalidPath);
    }

    let route = state
        .routes
        .resolve(req.path())
        .ok_or(GatewayError::NoRoute)?;

    let mut url = format!("{}{}", route.upstream, req.path());
    if !req.query_string().is_empty() {
        url.push('?');
        url.push_str(req.query_string());
    }

    let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|e| GatewayError::Upstream(e.to_string()))?;

    let mut headers = UpstreamHeaders::new();
    for (name, value) in req.headers() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }

    debug!(method = %method, upstream = %route.upstream, path = %req.path(), "Forwarding request");

    let upstream = state
        .client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            error!(upstream = %route.upstream, error = %e, "Upstream request failed");
            GatewayError::Upstream(e.to_string())
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| GatewayError::Upstream(e.to_string()))?;

    let mut response = HttpResponse::build(status);
    for (name, value) in upstream.headers() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let Ok(name) = ActixHeaderName::from_bytes(name.as_str().as_bytes()) {
            if let Ok(value) =
                actix_web::http::header::HeaderValue::from_bytes(value.as_bytes())
            {
                response.append_header((name, value));
            }
        }
    }

    let payload = upstream
        .bytes()
        .await
        .map_err(|e| GatewayError::Upstream(e.to_string()))?;

    Ok(response.body(payload))
}

/// Gateway liveness
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
