// ==========================================
// SWIFT 代码登记系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / Import 错误为调用方可理解的错误
// 未分类错误对外只给通用消息，详细信息写入日志
// ==========================================

use crate::importer::ImportError as ImporterError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 调用方错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("资源已存在: {0}")]
    Conflict(String),

    #[error("格式错误: {0}")]
    InvalidFormat(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误代码（对外契约）
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidFormat(_) => "INVALID_FORMAT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 是否由调用方输入导致
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_)
                | ApiError::Conflict(_)
                | ApiError::InvalidFormat(_)
                | ApiError::ValidationError(_)
                | ApiError::ImportError(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::HierarchyViolation(msg) => {
                ApiError::InternalError(format!("层级规则违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImporterError> for ApiError {
    fn from(err: ImporterError) -> Self {
        match err {
            ImporterError::Repository(e) => ApiError::from(e),
            e if e.is_input_error() => ApiError::ImportError(e.to_string()),
            e => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// ErrorResponse - 对外错误信封
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            tracing::error!(code = err.error_code(), error = %err, "请求处理失败");
            "服务内部错误，请查看日志".to_string()
        };

        Self {
            code: err.error_code().to_string(),
            message,
        }
    }
}

/// 将ApiError转换为JSON字符串
pub fn map_api_error(err: &ApiError) -> String {
    let error_response = ErrorResponse::from(err);
    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "SwiftCode".to_string(),
            id: "ABCDPLPWXXX".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("SwiftCode"));
                assert!(msg.contains("ABCDPLPWXXX"));
            }
            _ => panic!("Expected NotFound"),
        }

        let api_err: ApiError =
            RepositoryError::UniqueConstraintViolation("swift_codes.swift_code".to_string()).into();
        assert_eq!(api_err.error_code(), "CONFLICT");
    }

    #[test]
    fn test_import_error_conversion() {
        let api_err: ApiError = ImporterError::MissingColumn {
            column: "SWIFT CODE".to_string(),
        }
        .into();
        assert_eq!(api_err.error_code(), "IMPORT_ERROR");
        assert!(api_err.to_string().contains("SWIFT CODE"));

        let api_err: ApiError =
            ImporterError::Repository(RepositoryError::LockError("poisoned".to_string())).into();
        assert_eq!(api_err.error_code(), "DATABASE_CONNECTION_ERROR");
        assert!(!api_err.is_client_error());
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let err = ApiError::InternalError("secret detail".to_string());
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, "INTERNAL_ERROR");
        assert!(!response.message.contains("secret detail"));

        let err = ApiError::Conflict("ABCDPLPWXXX".to_string());
        let json = map_api_error(&err);
        assert!(json.contains("\"code\":\"CONFLICT\""));
        assert!(json.contains("ABCDPLPWXXX"));
    }
}
