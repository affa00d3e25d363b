use super::correlation::CorrelationId;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use log::{debug, error, log_enabled, trace, warn, Level};
use std::net::SocketAddr;
use std::time::Instant;

const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key", "cookie"];
const MAX_HEADER_VALUE_LEN: usize = 128;
const PROBE_PATHS: &[&str] = &["/health", "/ready", "/metrics"];

fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let val = if REDACTED_HEADERS.contains(&name.as_str()) {
                "<redacted>".to_string()
            } else {
                value
                    .to_str()
                    .map(|s| {
                        let mut out = s.to_string();
                        if out.len() > MAX_HEADER_VALUE_LEN {
                            let mut cut = MAX_HEADER_VALUE_LEN;
                            while !out.is_char_boundary(cut) {
                                cut -= 1;
                            }
                            out.truncate(cut);
                            out.push_str("...");
                        }
                        out
                    })
                    .unwrap_or_else(|_| "<non-utf8>".to_string())
            };
            (name.as_str().to_string(), val)
        })
        .collect()
}

fn content_length(headers: &HeaderMap) -> u64 {
    headers
        .get(axum::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0)
}

pub async fn logging_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|ConnectInfo(addr)| addr.ip().to_string()).unwrap_or_default();
    let correlation_id = req.extensions().get::<CorrelationId>().map(|id| id.0.clone()).unwrap_or_default();
    let request_body_size = content_length(req.headers());
    if log_enabled!(target: "http", Level::Debug) {
        debug!(
            target: "http",
            "request headers correlation_id={} method={} uri={} request_headers={:?}",
            correlation_id,
            method,
            req.uri(),
            sanitize_headers(req.headers())
        );
    }
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();
    let response_body_size = content_length(response.headers());

    if PROBE_PATHS.contains(&path.as_str()) {
        trace!(target: "http", "health check correlation_id={} path={} status={} duration_ms={}", correlation_id, path, status, duration_ms);
    } else if response.status().is_server_error() {
        error!(
            target: "http",
            "request failed correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={} response_body_size={}",
            correlation_id, client_ip, method, path, status, duration_ms, request_body_size, response_body_size
        );
    } else if response.status().is_client_error() {
        warn!(
            target: "http",
            "request rejected correlation_id={} client_ip={} method={} path={} status={} duration_ms={} request_body_size={}",
            correlation_id, client_ip, method, path, status, duration_ms, request_body_size
        );
    } else {
        debug!(
            target: "http",
            "request correlation_id={} client_ip={} method={} path={} status={} duration_ms={}",
            correlation_id, client_ip, method, path, status, duration_ms
        );
    }

    response
}
