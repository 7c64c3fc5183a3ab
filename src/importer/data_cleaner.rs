// ==========================================
// SWIFT 代码登记系统 - 数据清洗器实现
// ==========================================
// 阶段 2: TRIM / UPPER / NULL 标准化
// - 国家代码、银行名称、国家名称转大写
// - SWIFT 代码只去空白，不强制大写（格式由校验阶段判断）
// ==========================================

use crate::domain::RawSwiftCodeRow;
use crate::importer::swift_code_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleaner {
    fn clean_field(&self, value: Option<String>, uppercase: bool) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(&v, uppercase)))
    }
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn clean_row(&self, row: RawSwiftCodeRow) -> RawSwiftCodeRow {
        RawSwiftCodeRow {
            row_number: row.row_number,
            swift_code: self.clean_field(row.swift_code, false),
            bank_name: self.clean_field(row.bank_name, true),
            address: self.clean_field(row.address, false),
            country_iso2: self.clean_field(row.country_iso2, true),
            country_name: self.clean_field(row.country_name, true),
        }
    }
}
