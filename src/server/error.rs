use crate::utils::error::RecsysError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API 錯誤回應：{"error": ..., "code": ...}
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::NOT_FOUND,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RecsysError> for ApiError {
    fn from(err: RecsysError) -> Self {
        match err {
            RecsysError::CustomerNotFound { .. } => Self::not_found(err.to_string()),
            RecsysError::ValidationError { .. } => Self::bad_request(err.to_string()),
            other => {
                tracing::error!("❌ Request failed: {} ({:?})", other, other.category());
                Self::internal(other.user_friendly_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "code": self.status_code.as_u16(),
        }));
        (self.status_code, body).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
