use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cosign_core::foundation::{ErrorCode, ErrorKind};
use cosign_core::CosignError;
use log::error;
use serde_json::json;

/// Transport wrapper that renders a `CosignError` as `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub struct ApiError(pub CosignError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(&self.0)
    }
}

pub fn status_for(err: &CosignError) -> StatusCode {
    if err.code() == ErrorCode::Unauthorized {
        return StatusCode::UNAUTHORIZED;
    }
    match err.kind() {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authorization => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StateConflict => StatusCode::CONFLICT,
        ErrorKind::Ledger => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CosignError> for ApiError {
    fn from(err: CosignError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CosignError::invalid_input("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(CosignError::invalid_input("query", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(CosignError::invalid_input("path", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed with internal error code={} error={}", code.as_str(), self.0);
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "error": { "code": code.as_str(), "message": message } }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
