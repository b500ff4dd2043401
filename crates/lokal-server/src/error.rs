//! Mapping of domain errors onto HTTP responses.
//!
//! Every error body has the shape
//! `{ "error": { "code": "...", "message": "..." } }`.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lokal_core::error::LokalError;
use lokal_entitlements::EntitlementError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub LokalError);

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            LokalError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            LokalError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation"),
            LokalError::AlreadyExists { .. } => (StatusCode::CONFLICT, "already_exists"),
            LokalError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
            LokalError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl From<LokalError> for ApiError {
    fn from(err: LokalError) -> Self {
        Self(err)
    }
}

impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = if status.is_server_error() {
            error!(error = %self.0, "Request failed");
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

/// Extractor rejections surface as 400 with the same body shape.
macro_rules! rejection_into_api_error {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self(LokalError::validation(rejection.body_text()))
                }
            }
        )*
    };
}

rejection_into_api_error!(JsonRejection, PathRejection, QueryRejection);
