// ==========================================
// SWIFT 代码登记系统 - 导入层
// ==========================================
// 职责: 表格文件 → 校验、去重、关联后的 SWIFT 代码记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod hierarchy_linker;
pub mod swift_code_importer_impl;
pub mod swift_code_importer_trait;

// 重导出核心类型
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ColumnIndex, FieldMapper as FieldMapperImpl};
pub use file_parser::{CellValue, CsvParser, ExcelParser, RawRow, RawTable, UniversalFileParser};
pub use hierarchy_linker::{HierarchyLinker, LinkOutcome};
pub use swift_code_importer_impl::SwiftCodeImporterImpl;

// 重导出 Trait 接口
pub use swift_code_importer_trait::{
    ConflictHandler, DataCleaner, DqValidator, FieldMapper, FileParser, SwiftCodeImporter,
};
