use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

// The JSON structure for errors
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub errors: Vec<ErrorDetail>,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum AppError {
    /// A credential or endpoint needed for this request is not configured.
    MissingCredentials(String),
    /// The upstream service answered with a non-success status.
    UpstreamError(String),
    HttpError(reqwest::Error),
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MissingCredentials(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CFG-500"),
            AppError::UpstreamError(_) => (StatusCode::BAD_GATEWAY, "UPS-502"),
            AppError::HttpError(_) => (StatusCode::BAD_GATEWAY, "HTTP-502"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VAL-400"),
            AppError::NotFoundError(_) => (StatusCode::NOT_FOUND, "NOT-404"),
            AppError::InternalServerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INT-500"),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingCredentials(msg) => write!(f, "missing credentials: {}", msg),
            AppError::UpstreamError(msg) => write!(f, "upstream error: {}", msg),
            AppError::HttpError(e) => write!(f, "http error: {}", e),
            AppError::ValidationError(msg) => write!(f, "validation error: {}", msg),
            AppError::NotFoundError(msg) => write!(f, "not found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

// Convert AppError -> HTTP Response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::HttpError(e) => {
                tracing::error!("Upstream transport error: {:?}", e);
                "Failed to reach upstream service".to_string()
            }
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream error: {}", msg);
                msg
            }
            AppError::MissingCredentials(msg) => {
                tracing::error!("Missing credentials: {}", msg);
                msg
            }
            AppError::ValidationError(msg)
            | AppError::NotFoundError(msg)
            | AppError::InternalServerError(msg) => msg,
        };

        let body = Json(ErrorResponse {
            success: false,
            errors: vec![ErrorDetail {
                code: code.to_string(),
                message,
            }],
        });

        (status, body).into_response()
    }
}

// Allow ? operator for reqwest errors
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpError(err)
    }
}
