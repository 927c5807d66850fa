//! API 에러 타입

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use roster_sql::ColumnValidationError;

use crate::entities::RuleViolation;

/// API 에러
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("{0}")]
    UnknownColumn(#[from] ColumnValidationError),

    #[error("{0}")]
    Rule(#[from] RuleViolation),

    /// 쓰기 문장이 DB에서 거부됨 (제약 조건 위반 등)
    #[error("write rejected: {0}")]
    WriteRejected(roster_sql::Error),

    #[error("sql error: {0}")]
    Sql(#[from] roster_sql::Error),
}

impl ApiError {
    /// 쓰기 경로용 변환: DB 에러는 400, 나머지는 기본 매핑
    pub fn from_write(err: roster_sql::Error) -> Self {
        match err {
            roster_sql::Error::Database(_) => ApiError::WriteRejected(err),
            other => ApiError::Sql(other),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. }
            | ApiError::UnknownColumn(_)
            | ApiError::Rule(_)
            | ApiError::WriteRejected(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Sql(roster_sql::Error::InvalidArgument { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Sql(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 잘못된 JSON 본문 (파싱 실패, content-type 누락 포함)
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// 정수가 아닌 id 경로
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            ApiError::BadRequest { message } => ("BAD_REQUEST", message.clone()),
            ApiError::NotFound { message } => ("NOT_FOUND", message.clone()),
            ApiError::UnknownColumn(e) => ("UNKNOWN_COLUMN", e.to_string()),
            ApiError::Rule(e) => ("VALIDATION_FAILED", e.to_string()),
            ApiError::WriteRejected(e) => {
                tracing::warn!("Write rejected: {:?}", e);
                ("WRITE_REJECTED", "Database rejected the write".to_string())
            }
            ApiError::Sql(e @ roster_sql::Error::InvalidArgument { .. }) => {
                ("INVALID_ARGUMENT", e.to_string())
            }
            ApiError::Sql(roster_sql::Error::Database(e)) => {
                tracing::error!("Database error: {:?}", e);
                ("DATABASE_ERROR", "Database operation failed".to_string())
            }
            ApiError::Sql(e) => {
                tracing::error!("Internal error: {}", e);
                ("INTERNAL_ERROR", "Internal error".to_string())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
