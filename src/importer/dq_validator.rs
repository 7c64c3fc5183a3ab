// ==========================================
// SWIFT 代码登记系统 - 数据质量校验器实现
// ==========================================
// 阶段 4: 字段级校验，违规行跳过（不影响整批）
// 规则:
// - SWIFT 代码: ^[A-Z]{6}[A-Z0-9]{2}[A-Z0-9]{3}$
// - 国家代码: 2 位大写字母
// - 银行名称、国家名称: 非空
// ==========================================

use crate::domain::columns::{
    BANK_NAME_HEADER, COUNTRY_ISO2_HEADER, COUNTRY_NAME_HEADER, SWIFT_CODE_HEADER,
};
use crate::domain::{is_valid_country_iso2, is_valid_swift_code, DqViolation, RawSwiftCodeRow};
use crate::importer::swift_code_importer_trait::DqValidator as DqValidatorTrait;

pub struct DqValidator;

impl DqValidator {
    fn violation(row: &RawSwiftCodeRow, field: &str, message: String) -> DqViolation {
        DqViolation {
            row_number: row.row_number,
            swift_code: row.swift_code.clone(),
            field: field.to_string(),
            message,
        }
    }

    fn require<'a>(
        row: &RawSwiftCodeRow,
        value: &'a Option<String>,
        field: &str,
        violations: &mut Vec<DqViolation>,
    ) -> Option<&'a str> {
        match value.as_deref() {
            Some(v) if !v.trim().is_empty() => Some(v),
            _ => {
                violations.push(Self::violation(row, field, "必填字段为空".to_string()));
                None
            }
        }
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_row(&self, row: &RawSwiftCodeRow) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        if let Some(code) = Self::require(row, &row.swift_code, SWIFT_CODE_HEADER, &mut violations)
        {
            if !is_valid_swift_code(code) {
                violations.push(Self::violation(
                    row,
                    SWIFT_CODE_HEADER,
                    format!("SWIFT 代码格式错误: {}", code),
                ));
            }
        }

        if let Some(iso2) =
            Self::require(row, &row.country_iso2, COUNTRY_ISO2_HEADER, &mut violations)
        {
            if !is_valid_country_iso2(iso2) {
                violations.push(Self::violation(
                    row,
                    COUNTRY_ISO2_HEADER,
                    format!("国家代码必须为 2 位大写字母: {}", iso2),
                ));
            }
        }

        Self::require(row, &row.bank_name, BANK_NAME_HEADER, &mut violations);
        Self::require(row, &row.country_name, COUNTRY_NAME_HEADER, &mut violations);

        violations
    }
}
