// ==========================================
// SWIFT 代码登记系统 - 导入模块错误类型
// ==========================================
// 只包含结构性错误（整批中止、不写入任何数据）
// 行级问题不产生错误，只计数并记录日志
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 表结构错误 =====
    #[error("文件无工作表")]
    NoSheets,

    #[error("工作表不存在: {0}")]
    SheetNotFound(String),

    #[error("输入为空")]
    EmptyInput,

    #[error("缺少表头行")]
    MissingHeaderRow,

    #[error("缺少必需列: {column}")]
    MissingColumn { column: String },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ImportError {
    /// 是否由输入文件本身导致
    pub fn is_input_error(&self) -> bool {
        !matches!(
            self,
            ImportError::Repository(_)
                | ImportError::ConfigReadError { .. }
                | ImportError::InternalError(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_column() {
        let err = ImportError::MissingColumn {
            column: "COUNTRY ISO2 CODE".to_string(),
        };
        assert!(err.to_string().contains("COUNTRY ISO2 CODE"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_repository_error_is_not_input_error() {
        let err: ImportError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(!err.is_input_error());
    }
}
