use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::models::common::ApiResponse;

/// 服务调用和查询缓存共用的错误类型
///
/// 需要是 `Clone`，同一个请求的结果会分发给所有等待者。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// 网络不可达、超时或服务端 5xx，可以重试
    #[error("transport error: {0}")]
    Transport(String),
    /// 服务端返回的 4xx 校验错误，不重试
    #[error("validation failed ({status}): {message}")]
    Validation { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// 乐观更新之后请求失败，缓存已经回滚并失效
    #[error("optimistic update rolled back: {0}")]
    StaleOptimistic(Box<ServiceError>),
    #[error("query store has been disposed")]
    Disposed,
}

impl ServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Transport(_))
    }

    pub fn validation(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// 模拟后端的内存数据库错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
}

/// 模拟后端 HTTP 层的错误
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Conflict(String),
    Validation(String),
    InternalServerError,
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => AppError::NotFound(err.to_string()),
            DatabaseError::Conflict(msg) => AppError::Conflict(msg),
            DatabaseError::Invalid(msg) => AppError::Validation(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(ApiResponse::<()>::error(error_message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(ServiceError::Transport("connection refused".into()).is_retryable());
        assert!(!ServiceError::validation(422, "email is invalid").is_retryable());
        assert!(!ServiceError::NotFound("user 7".into()).is_retryable());
        assert!(!ServiceError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn database_errors_map_to_http_statuses() {
        let not_found = AppError::from(DatabaseError::NotFound("user 9".into())).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict =
            AppError::from(DatabaseError::Conflict("username taken".into())).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let invalid = AppError::from(DatabaseError::Invalid("bad role".into())).into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
