use crate::api::error::ApiError;
use crate::api::state::ApiState;
use axum::body::Body;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cosign_core::CosignError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Routes reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/health"];

/// Accepts `x-api-key: <token>` or `Authorization: Bearer <token>`. No configured token means open access.
pub fn authorize_request(headers: &HeaderMap, expected: Option<&str>) -> Result<(), CosignError> {
    let expected = match expected {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return Ok(()),
    };

    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        if constant_time_eq(value, expected) {
            return Ok(());
        }
    }
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = value.strip_prefix("Bearer ") {
            if constant_time_eq(token, expected) {
                return Ok(());
            }
        }
    }
    Err(CosignError::Unauthorized("missing or invalid api token".to_string()))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

pub async fn auth_middleware(State(state): State<Arc<ApiState>>, req: Request<Body>, next: Next) -> Response {
    if PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }
    match authorize_request(req.headers(), state.rpc_token.as_deref()) {
        Ok(()) => next.run(req).await,
        Err(err) => ApiError(err).into_response(),
    }
}
