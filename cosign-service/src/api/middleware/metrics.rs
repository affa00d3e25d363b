use crate::api::state::ApiState;
use axum::body::Body;
use axum::extract::{MatchedPath, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// Counts requests by route template (not raw path) and status code.
pub async fn metrics_middleware(State(state): State<Arc<ApiState>>, req: Request<Body>, next: Next) -> Response {
    let route = req.extensions().get::<MatchedPath>().map(|path| path.as_str().to_string()).unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(req).await;
    state.metrics.inc_api_request(&route, response.status().as_u16());
    response
}
