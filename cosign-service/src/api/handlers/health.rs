use crate::api::state::ApiState;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{debug, trace, warn};
use std::sync::Arc;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({
        "status": "healthy",
    }))
}

/// Ready when storage answers; the ledger breaker state is reported but does not gate readiness.
pub async fn handle_ready(State(state): State<Arc<ApiState>>) -> Response {
    let storage = state.ctx.storage.health_check();
    let storage_ok = storage.is_ok();
    if let Err(err) = storage {
        warn!("ready check: storage unhealthy error={}", err);
    }
    let body = Json(serde_json::json!({
        "status": if storage_ok { "ready" } else { "degraded" },
        "storageOk": storage_ok,
    }));
    if storage_ok {
        trace!("ready check: ok");
        body.into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

pub async fn handle_metrics(State(state): State<Arc<ApiState>>) -> Response {
    match state.metrics.encode() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(axum::http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));
            response
        }
        Err(err) => {
            debug!("metrics encode failed error={}", err);
            crate::api::ApiError(err).into_response()
        }
    }
}
