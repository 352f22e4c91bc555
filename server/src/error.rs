use crate::db::StoreError;
use ntex::http::StatusCode;
use ntex::web::{HttpRequest, HttpResponse, WebResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        fields: Vec<&'static str>,
        received: Option<serde_json::Value>,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl AppError {
    pub fn bad_field(field: &'static str, message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            fields: vec![field],
            received: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::BadRequest { .. } => "bad_request",
            AppError::InvalidPayload(_) => "invalid_payload",
            AppError::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

impl WebResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest { .. } | AppError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self, _: &HttpRequest) -> HttpResponse {
        let body = match self {
            AppError::Unauthorized(msg) => json!({ "error": self.kind(), "message": msg }),
            AppError::BadRequest {
                message,
                fields,
                received,
            } => json!({
                "error": self.kind(),
                "message": message,
                "fields": fields,
                "received": received,
            }),
            AppError::InvalidPayload(msg) => json!({ "error": self.kind(), "message": msg }),
            AppError::StorageUnavailable(e) => {
                error!(error = %e, "storage failure");
                json!({ "error": self.kind(), "message": "Storage unavailable" })
            }
        };
        HttpResponse::build(self.status_code()).json(&body)
    }
}
