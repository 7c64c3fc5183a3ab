// ==========================================
// SWIFT 代码登记系统 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 解析 → 映射 → 清洗 → 去重 → 校验 → 关联 → 落库
// ==========================================

use crate::domain::{DqViolation, ImportReport, RawSwiftCodeRow};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::ColumnIndex;
use crate::importer::file_parser::{RawRow, RawTable};
use std::collections::HashSet;
use std::path::Path;

// ==========================================
// SwiftCodeImporter Trait
// ==========================================
// 用途: 批量导入主接口
// 实现者: SwiftCodeImporterImpl
pub trait SwiftCodeImporter: Send + Sync {
    /// 按扩展名自动选择解析器导入
    ///
    /// # 返回
    /// - Ok(ImportReport): 批次计数汇总
    /// - Err: 结构性错误（缺列、无工作表、空文件等），整批不写入
    fn import_file(&self, file_path: &Path) -> ImportResult<ImportReport>;

    /// 从 Excel 类文件导入（.xlsx/.xlsm/.xls/.ods）
    fn import_from_excel(&self, file_path: &Path) -> ImportResult<ImportReport>;

    /// 从 CSV 文件导入
    fn import_from_csv(&self, file_path: &Path) -> ImportResult<ImportReport>;

    /// 导入已解析的表格
    fn import_table(&self, table: RawTable, file_name: Option<String>)
        -> ImportResult<ImportReport>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 数据行
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet_name: 工作表名称（None 时取第一个；CSV 忽略）
    fn parse(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 按列名映射字段（阶段 1）
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 由表头构建列索引；缺少必需列时返回 MissingColumn
    fn resolve_columns(&self, headers: &[String]) -> ImportResult<ColumnIndex>;

    /// 是否为完全空白的行
    fn is_empty_row(&self, row: &RawRow) -> bool;

    /// 将数据行映射为 RawSwiftCodeRow（不可读单元格映射为 None）
    fn map_row(&self, columns: &ColumnIndex, row: &RawRow) -> RawSwiftCodeRow;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 数据清洗接口（阶段 2）
// 实现者: DataCleanerImpl
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM + 可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 清洗整行
    fn clean_row(&self, row: RawSwiftCodeRow) -> RawSwiftCodeRow;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 重复检测（阶段 3）
// 实现者: ConflictHandlerImpl
pub trait ConflictHandler: Send + Sync {
    /// 检测同批次内重复代码
    ///
    /// # 返回
    /// - Vec<(行号, swift_code)>: 重复行（不包括第一次出现）
    fn detect_duplicates(&self, rows: &[RawSwiftCodeRow]) -> Vec<(usize, String)>;

    /// 检测已在库中的代码
    ///
    /// # 参数
    /// - existing_codes: 库中已存在的代码集合
    fn detect_cross_batch_duplicates(
        &self,
        rows: &[RawSwiftCodeRow],
        existing_codes: &HashSet<String>,
    ) -> Vec<(usize, String)>;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 字段级校验（阶段 4）
// 实现者: DqValidatorImpl
pub trait DqValidator: Send + Sync {
    /// 校验单行；返回空列表表示通过
    fn validate_row(&self, row: &RawSwiftCodeRow) -> Vec<DqViolation>;
}
