//! 애플리케이션 전역에서 사용하는 에러 시스템
//!
//! 게이트웨이 인증 체인과 업스트림 ID 백엔드 호출에서 발생하는 에러를 하나의 타입으로 모읍니다.
//! 클라이언트에게는 HTTP 상태 코드(401/403/500 등)로만 구분되어 노출됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::errors::AppError;
//!
//! async fn me(backend: &dyn IdentityBackend, cred: &AuthCredential) -> Result<UserInfo, AppError> {
//!     if cred.is_empty() {
//!         return Err(AppError::AuthenticationError("로그인이 필요합니다".to_string()));
//!     }
//!     backend.me(cred).await
//! }
//! ```

use thiserror::Error;

/// 게이트웨이 에러 타입
///
/// | AppError | HTTP Status |
/// |----------|-------------|
/// | `ValidationError` | 400 |
/// | `UnsupportedOperation` | 400 |
/// | `AuthenticationError` | 401 |
/// | `AuthorizationError` | 403 |
/// | `NotFound` | 404 |
/// | `ExternalServiceError` / `RedisError` / `InternalError` | 500 |
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 업스트림(UC, IAM, Kratos, core-services) 호출 실패
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 선택된 ID 백엔드가 지원하지 않는 연산
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) | AppError::UnsupportedOperation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(AppError::status_code(self))
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::RedisError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}
