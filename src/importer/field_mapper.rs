// ==========================================
// SWIFT 代码登记系统 - 字段映射器实现
// ==========================================
// 阶段 1: 按列名（而非列位置）提取字段
// 列名精确匹配（去首尾空白、区分大小写）
// ==========================================

use crate::domain::columns::{
    ADDRESS_HEADER, BANK_NAME_HEADER, COUNTRY_ISO2_HEADER, COUNTRY_NAME_HEADER,
    REQUIRED_COLUMNS, SWIFT_CODE_HEADER,
};
use crate::domain::RawSwiftCodeRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{CellValue, RawRow};
use crate::importer::swift_code_importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ColumnIndex - 列名 → 列下标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    columns: HashMap<String, usize>,
}

impl ColumnIndex {
    /// 由表头构建；同名列以第一次出现为准
    pub fn from_headers(headers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim();
            if name.is_empty() {
                continue;
            }
            columns.entry(name.to_string()).or_insert(idx);
        }
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns.get(column).copied()
    }

    /// 第一个缺失的必需列
    pub fn first_missing(&self, required: &[&str]) -> Option<String> {
        required
            .iter()
            .find(|column| !self.columns.contains_key(**column))
            .map(|column| column.to_string())
    }
}

pub struct FieldMapper;

impl FieldMapper {
    /// 读取单元格文本
    ///
    /// - 列不存在 / 单元格为空 → None
    /// - 不可读单元格 → None
    /// - 数值、布尔、日期 → 文本形式
    fn get_string(&self, columns: &ColumnIndex, row: &RawRow, column: &str) -> Option<String> {
        let idx = columns.get(column)?;
        match row.cell(idx) {
            CellValue::Empty => None,
            CellValue::Error(reason) => {
                debug!(
                    row_number = row.row_number,
                    column = column,
                    reason = %reason,
                    "单元格不可读"
                );
                None
            }
            cell => cell.as_text(),
        }
    }
}

impl FieldMapperTrait for FieldMapper {
    fn resolve_columns(&self, headers: &[String]) -> ImportResult<ColumnIndex> {
        let columns = ColumnIndex::from_headers(headers);
        if let Some(column) = columns.first_missing(&REQUIRED_COLUMNS) {
            return Err(ImportError::MissingColumn { column });
        }
        Ok(columns)
    }

    fn is_empty_row(&self, row: &RawRow) -> bool {
        row.cells.iter().all(CellValue::is_blank)
    }

    fn map_row(&self, columns: &ColumnIndex, row: &RawRow) -> RawSwiftCodeRow {
        RawSwiftCodeRow {
            row_number: row.row_number,
            country_iso2: self.get_string(columns, row, COUNTRY_ISO2_HEADER),
            swift_code: self.get_string(columns, row, SWIFT_CODE_HEADER),
            bank_name: self.get_string(columns, row, BANK_NAME_HEADER),
            address: self.get_string(columns, row, ADDRESS_HEADER),
            country_name: self.get_string(columns, row, COUNTRY_NAME_HEADER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_resolve_columns_reports_missing_column() {
        let mapper = FieldMapper;
        let result = mapper.resolve_columns(&headers(&["SWIFT CODE", "NAME", "COUNTRY NAME"]));

        match result {
            Err(ImportError::MissingColumn { column }) => {
                assert_eq!(column, "COUNTRY ISO2 CODE")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_header_names_are_case_sensitive() {
        let mapper = FieldMapper;
        let result = mapper.resolve_columns(&headers(&[
            "country iso2 code",
            "SWIFT CODE",
            "NAME",
            "COUNTRY NAME",
        ]));
        assert!(matches!(result, Err(ImportError::MissingColumn { .. })));
    }

    #[test]
    fn test_map_row_by_name_not_position() {
        let mapper = FieldMapper;
        let columns = mapper
            .resolve_columns(&headers(&[
                "COUNTRY NAME",
                "NAME",
                "SWIFT CODE",
                "TIME ZONE",
                "COUNTRY ISO2 CODE",
            ]))
            .unwrap();

        let row = RawRow {
            row_number: 4,
            cells: vec![
                text("POLAND"),
                text("TEST BANK"),
                text("ABCDPLPWXXX"),
                text("Europe/Warsaw"),
                text("PL"),
            ],
        };

        let mapped = mapper.map_row(&columns, &row);

        assert_eq!(mapped.row_number, 4);
        assert_eq!(mapped.swift_code.as_deref(), Some("ABCDPLPWXXX"));
        assert_eq!(mapped.country_iso2.as_deref(), Some("PL"));
        assert_eq!(mapped.bank_name.as_deref(), Some("TEST BANK"));
        assert_eq!(mapped.address, None);
        assert_eq!(mapped.first_missing_required(), None);
    }

    #[test]
    fn test_unreadable_and_numeric_cells() {
        let mapper = FieldMapper;
        let columns = mapper
            .resolve_columns(&headers(&[
                "COUNTRY ISO2 CODE",
                "SWIFT CODE",
                "NAME",
                "ADDRESS",
                "COUNTRY NAME",
            ]))
            .unwrap();

        let row = RawRow {
            row_number: 1,
            cells: vec![
                text("PL"),
                text("ABCDPLPWXXX"),
                CellValue::Error("Ref".to_string()),
                CellValue::Float(42.0),
            ],
        };

        let mapped = mapper.map_row(&columns, &row);

        assert_eq!(mapped.bank_name, None);
        assert_eq!(mapped.address.as_deref(), Some("42"));
        assert_eq!(mapped.country_name, None);
        assert_eq!(mapped.first_missing_required(), Some("NAME"));
    }

    #[test]
    fn test_empty_row_detection() {
        let mapper = FieldMapper;
        let blank = RawRow {
            row_number: 2,
            cells: vec![CellValue::Empty, text("   ")],
        };
        let not_blank = RawRow {
            row_number: 3,
            cells: vec![CellValue::Empty, CellValue::Int(0)],
        };

        assert!(mapper.is_empty_row(&blank));
        assert!(!mapper.is_empty_row(&not_blank));
    }
}
