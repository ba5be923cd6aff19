use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use easyocr_core::common::OcrError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// A rejected request. Always rendered as `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<OcrError> for ApiError {
    fn from(err: OcrError) -> Self {
        if err.is_validation() {
            ApiError::bad_request(err.to_string())
        } else {
            ApiError::bad_request(format!("An unexpected error occurred: {}", err))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
