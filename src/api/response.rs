//! 统一 JSON 响应

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::ShortpathError;

/// API 错误码
///
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 访问控制
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 1000,
    InternalServerError = 1005,

    PasswordRequired = 2000,
    AuthFailed = 2001,

    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    PathSpaceExhausted = 3002,
}

impl From<&ShortpathError> for ErrorCode {
    fn from(err: &ShortpathError) -> Self {
        match err {
            ShortpathError::Validation(_) => ErrorCode::BadRequest,
            ShortpathError::NotFound(_) => ErrorCode::LinkNotFound,
            ShortpathError::Conflict(_) => ErrorCode::LinkAlreadyExists,
            ShortpathError::Exhausted(_) => ErrorCode::PathSpaceExhausted,
            ShortpathError::AuthFailure(_) => ErrorCode::AuthFailed,
            ShortpathError::Internal(_)
            | ShortpathError::DatabaseConfig(_)
            | ShortpathError::DatabaseConnection(_)
            | ShortpathError::DatabaseOperation(_)
            | ShortpathError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    json_response(status, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

/// 从 ShortpathError 构建错误响应，服务端错误只记录日志不外泄细节
pub fn error_from_shortpath(err: &ShortpathError) -> HttpResponse {
    if !err.is_client_fault() {
        tracing::error!("{}", err.format_simple());
    }
    error_response(err.http_status(), ErrorCode::from(err), err.public_message())
}
