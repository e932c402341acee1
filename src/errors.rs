use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortpathError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    Exhausted(String),
    AuthFailure(String),
    Internal(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Config(String),
}

impl ShortpathError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ShortpathError::Validation(_) => "E001",
            ShortpathError::NotFound(_) => "E002",
            ShortpathError::Conflict(_) => "E003",
            ShortpathError::Exhausted(_) => "E004",
            ShortpathError::AuthFailure(_) => "E005",
            ShortpathError::Internal(_) => "E006",
            ShortpathError::DatabaseConfig(_) => "E007",
            ShortpathError::DatabaseConnection(_) => "E008",
            ShortpathError::DatabaseOperation(_) => "E009",
            ShortpathError::Config(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            ShortpathError::Validation(_) => "Validation Error",
            ShortpathError::NotFound(_) => "Resource Not Found",
            ShortpathError::Conflict(_) => "Path Conflict",
            ShortpathError::Exhausted(_) => "Path Space Exhausted",
            ShortpathError::AuthFailure(_) => "Authentication Failure",
            ShortpathError::Internal(_) => "Internal Error",
            ShortpathError::DatabaseConfig(_) => "Database Configuration Error",
            ShortpathError::DatabaseConnection(_) => "Database Connection Error",
            ShortpathError::DatabaseOperation(_) => "Database Operation Error",
            ShortpathError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            ShortpathError::Validation(msg)
            | ShortpathError::NotFound(msg)
            | ShortpathError::Conflict(msg)
            | ShortpathError::Exhausted(msg)
            | ShortpathError::AuthFailure(msg)
            | ShortpathError::Internal(msg)
            | ShortpathError::DatabaseConfig(msg)
            | ShortpathError::DatabaseConnection(msg)
            | ShortpathError::DatabaseOperation(msg)
            | ShortpathError::Config(msg) => msg,
        }
    }

    /// 是否为客户端错误（客户端错误永不重试）
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            ShortpathError::Validation(_)
                | ShortpathError::NotFound(_)
                | ShortpathError::Conflict(_)
                | ShortpathError::AuthFailure(_)
        )
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            ShortpathError::Validation(_) => StatusCode::BAD_REQUEST,
            ShortpathError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortpathError::Conflict(_) => StatusCode::CONFLICT,
            ShortpathError::Exhausted(_) => StatusCode::INSUFFICIENT_STORAGE,
            ShortpathError::AuthFailure(_) => StatusCode::FORBIDDEN,
            ShortpathError::Internal(_)
            | ShortpathError::DatabaseConfig(_)
            | ShortpathError::DatabaseConnection(_)
            | ShortpathError::DatabaseOperation(_)
            | ShortpathError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对外展示的消息：服务端错误不泄露内部细节
    pub fn public_message(&self) -> &str {
        match self {
            ShortpathError::Exhausted(msg) => msg,
            _ if self.is_client_fault() => self.message(),
            _ => "Internal server error",
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for ShortpathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for ShortpathError {}

// 便捷的构造函数
impl ShortpathError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        ShortpathError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ShortpathError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ShortpathError::Conflict(msg.into())
    }

    pub fn exhausted<T: Into<String>>(msg: T) -> Self {
        ShortpathError::Exhausted(msg.into())
    }

    pub fn auth_failure<T: Into<String>>(msg: T) -> Self {
        ShortpathError::AuthFailure(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        ShortpathError::Internal(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ShortpathError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ShortpathError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        ShortpathError::DatabaseOperation(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        ShortpathError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<crate::storage::StoreError> for ShortpathError {
    fn from(err: crate::storage::StoreError) -> Self {
        use crate::storage::StoreError;
        match err {
            StoreError::UniqueViolation(short) => {
                ShortpathError::Conflict(format!("The path '/{}' is already in use.", short))
            }
            StoreError::Connection(msg) => ShortpathError::DatabaseConnection(msg),
            StoreError::Operation(msg) => ShortpathError::DatabaseOperation(msg),
            StoreError::Corrupt(msg) => ShortpathError::Internal(msg),
        }
    }
}

impl From<crate::utils::password::PasswordError> for ShortpathError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        ShortpathError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShortpathError>;
