//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + `errno` 返回，每个错误类别对应独立的 errno

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const AUTH_FAILURE: i32 = 401;
    pub const INVALID_GENRE: i32 = 422;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_ERROR: i32 = 502;
    pub const TRANSPORT_FAILURE: i32 = 503;
    pub const MISSING_CREDENTIAL: i32 = 511;
    pub const EMPTY_RESULT: i32 = 1001;
    pub const NO_AUDIO: i32 = 1002;
    pub const MALFORMED_AUDIO: i32 = 1003;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    InvalidGenre(String),
    AuthFailure(String),
    MissingCredential(String),
    ServiceError(String),
    TransportFailure(String),
    EmptyResult(String),
    NoAudio(String),
    MalformedAudio(String),
    Internal(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::InvalidGenre(_) => errno::INVALID_GENRE,
            ApiError::AuthFailure(_) => errno::AUTH_FAILURE,
            ApiError::MissingCredential(_) => errno::MISSING_CREDENTIAL,
            ApiError::ServiceError(_) => errno::SERVICE_ERROR,
            ApiError::TransportFailure(_) => errno::TRANSPORT_FAILURE,
            ApiError::EmptyResult(_) => errno::EMPTY_RESULT,
            ApiError::NoAudio(_) => errno::NO_AUDIO,
            ApiError::MalformedAudio(_) => errno::MALFORMED_AUDIO,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidGenre(msg)
            | ApiError::AuthFailure(msg)
            | ApiError::MissingCredential(msg)
            | ApiError::ServiceError(msg)
            | ApiError::TransportFailure(msg)
            | ApiError::EmptyResult(msg)
            | ApiError::NoAudio(msg)
            | ApiError::MalformedAudio(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let msg = self.message();

        match &self {
            ApiError::BadRequest(_) | ApiError::InvalidGenre(_) => {
                tracing::warn!(errno, error = %msg, "Bad request");
            }
            ApiError::EmptyResult(_) | ApiError::NoAudio(_) => {
                tracing::warn!(errno, error = %msg, "Generation produced no result");
            }
            ApiError::AuthFailure(_) | ApiError::MissingCredential(_) => {
                tracing::error!(errno, error = %msg, "Credential problem");
            }
            ApiError::ServiceError(_) | ApiError::TransportFailure(_) => {
                tracing::error!(errno, error = %msg, "Generation service unavailable");
            }
            ApiError::MalformedAudio(_) | ApiError::Internal(_) => {
                tracing::error!(errno, error = %msg, "Internal server error");
            }
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, msg))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        let msg = e.to_string();
        match e {
            ApplicationError::MissingCredential => ApiError::MissingCredential(msg),
            ApplicationError::InvalidGenre(_) => ApiError::InvalidGenre(msg),
            ApplicationError::ValidationError(_) => ApiError::BadRequest(msg),
            ApplicationError::MalformedAudioData(_) => ApiError::MalformedAudio(msg),
            ApplicationError::TransportFailure(_) => ApiError::TransportFailure(msg),
            ApplicationError::AuthFailure(_) => ApiError::AuthFailure(msg),
            ApplicationError::ServiceError(_) => ApiError::ServiceError(msg),
            ApplicationError::EmptyResult => ApiError::EmptyResult(msg),
            ApplicationError::NoAudioInResponse(_) => ApiError::NoAudio(msg),
            ApplicationError::StorageError(_) | ApplicationError::InternalError(_) => {
                ApiError::Internal(msg)
            }
        }
    }
}
