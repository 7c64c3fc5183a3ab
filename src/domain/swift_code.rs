// ==========================================
// SWIFT 代码登记系统 - SWIFT 代码领域模型
// ==========================================
// 规则:
// - 代码固定 11 位，后 3 位为 "XXX" 即为总行
// - 前 8 位（机构 + 国家 + 地区）相同的分行归属该总行
// - 国家字段始终以大写存储和返回
// ==========================================

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// SWIFT 代码长度
pub const SWIFT_CODE_LEN: usize = 11;

/// 总行与分行共享的前缀长度
pub const PREFIX_LEN: usize = 8;

/// 总行后缀
pub const HEAD_OFFICE_SUFFIX: &str = "XXX";

/// SWIFT 代码格式: 6 位字母 + 2 位字母数字 + 3 位字母数字
pub const SWIFT_CODE_PATTERN: &str = r"^[A-Z]{6}[A-Z0-9]{2}[A-Z0-9]{3}$";

fn swift_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SWIFT_CODE_PATTERN).expect("SWIFT_CODE_PATTERN 是合法正则"))
}

/// 代码是否满足 SWIFT 格式
pub fn is_valid_swift_code(code: &str) -> bool {
    swift_code_regex().is_match(code)
}

/// 国家代码是否为 2 位大写字母
pub fn is_valid_country_iso2(iso2: &str) -> bool {
    iso2.len() == 2 && iso2.chars().all(|c| c.is_ascii_uppercase())
}

/// 代码是否为总行代码
pub fn is_head_office_code(code: &str) -> bool {
    code.ends_with(HEAD_OFFICE_SUFFIX)
}

/// 取代码前 8 位；长度不足时返回 None
pub fn code_prefix(code: &str) -> Option<&str> {
    code.get(..PREFIX_LEN)
}

/// 推导分行对应的候选总行代码（前缀 + "XXX"）
pub fn head_office_code_for(code: &str) -> Option<String> {
    code_prefix(code).map(|prefix| format!("{}{}", prefix, HEAD_OFFICE_SUFFIX))
}

// ==========================================
// SwiftCodeRecord - SWIFT 代码记录
// ==========================================
// 对齐: swift_codes 表
// head_office_code 为非拥有引用；branch_codes 仅对总行有意义，由存储层派生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwiftCodeRecord {
    // ===== 主键 =====
    pub swift_code: String,

    // ===== 描述信息 =====
    pub bank_name: String,
    pub address: String,      // 可为空串
    pub country_iso2: String, // 大写
    pub country_name: String, // 大写

    // ===== 层级 =====
    pub is_head_office: bool,
    pub head_office_code: Option<String>, // 分行 → 总行
    pub branch_codes: Vec<String>,        // 总行 → 分行（插入顺序）

    // ===== 审计 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SwiftCodeRecord {
    /// 创建未关联的记录，is_head_office 由代码后缀派生
    pub fn new(
        swift_code: impl Into<String>,
        bank_name: impl Into<String>,
        address: impl Into<String>,
        country_iso2: impl Into<String>,
        country_name: impl Into<String>,
    ) -> Self {
        let swift_code = swift_code.into();
        let now = Utc::now();
        Self {
            is_head_office: is_head_office_code(&swift_code),
            swift_code,
            bank_name: bank_name.into(),
            address: address.into(),
            country_iso2: country_iso2.into(),
            country_name: country_name.into(),
            head_office_code: None,
            branch_codes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 代码前 8 位
    pub fn prefix(&self) -> Option<&str> {
        code_prefix(&self.swift_code)
    }

    /// 分行对应的候选总行代码；总行返回 None
    pub fn candidate_head_office_code(&self) -> Option<String> {
        if self.is_head_office {
            None
        } else {
            head_office_code_for(&self.swift_code)
        }
    }

    /// 是否为未关联总行的分行
    pub fn is_orphan_branch(&self) -> bool {
        !self.is_head_office && self.head_office_code.is_none()
    }

    /// 该记录是否可作为 head 的分行（前缀一致且自身不是总行）
    pub fn belongs_to(&self, head: &SwiftCodeRecord) -> bool {
        !self.is_head_office
            && head.is_head_office
            && self.swift_code != head.swift_code
            && self.prefix().is_some()
            && self.prefix() == head.prefix()
    }
}

// ==========================================
// RawSwiftCodeRow - 字段映射后的中间行
// ==========================================
// 所有字段均可能缺失，清洗/校验前不做任何假设
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSwiftCodeRow {
    pub row_number: usize, // 源文件行号（表头为 0）
    pub swift_code: Option<String>,
    pub bank_name: Option<String>,
    pub address: Option<String>,
    pub country_iso2: Option<String>,
    pub country_name: Option<String>,
}

impl RawSwiftCodeRow {
    /// 第一个缺失的必填字段（列名）
    pub fn first_missing_required(&self) -> Option<&'static str> {
        use crate::domain::columns::*;
        if self.country_iso2.is_none() {
            Some(COUNTRY_ISO2_HEADER)
        } else if self.swift_code.is_none() {
            Some(SWIFT_CODE_HEADER)
        } else if self.bank_name.is_none() {
            Some(BANK_NAME_HEADER)
        } else if self.country_name.is_none() {
            Some(COUNTRY_NAME_HEADER)
        } else {
            None
        }
    }

    /// 转为领域记录；必填字段缺失时返回 None
    pub fn into_record(self) -> Option<SwiftCodeRecord> {
        Some(SwiftCodeRecord::new(
            self.swift_code?,
            self.bank_name?,
            self.address.unwrap_or_default(),
            self.country_iso2?,
            self.country_name?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_office_derived_from_suffix() {
        let head = SwiftCodeRecord::new("ABCDPLPWXXX", "BANK", "", "PL", "POLAND");
        let branch = SwiftCodeRecord::new("ABCDPLPW123", "BANK", "", "PL", "POLAND");

        assert!(head.is_head_office);
        assert!(!branch.is_head_office);
        assert_eq!(head.candidate_head_office_code(), None);
        assert_eq!(
            branch.candidate_head_office_code().as_deref(),
            Some("ABCDPLPWXXX")
        );
        assert!(branch.belongs_to(&head));
        assert!(!head.belongs_to(&head));
    }

    #[test]
    fn test_swift_code_format() {
        assert!(is_valid_swift_code("ABCDPLPWXXX"));
        assert!(is_valid_swift_code("ABCDPL2W1A3"));
        assert!(!is_valid_swift_code("abcdplpwxxx"));
        assert!(!is_valid_swift_code("ABCD1LPWXXX"));
        assert!(!is_valid_swift_code("ABCDPLPWXX"));
        assert!(!is_valid_swift_code("ABCDPLPWXXXX"));
    }

    #[test]
    fn test_country_iso2_format() {
        assert!(is_valid_country_iso2("PL"));
        assert!(!is_valid_country_iso2("pl"));
        assert!(!is_valid_country_iso2("P1"));
        assert!(!is_valid_country_iso2("POL"));
    }

    #[test]
    fn test_prefix_of_short_code() {
        assert_eq!(code_prefix("ABC"), None);
        assert_eq!(head_office_code_for("ABC"), None);
    }

    #[test]
    fn test_raw_row_missing_field() {
        let row = RawSwiftCodeRow {
            row_number: 3,
            swift_code: Some("ABCDPLPWXXX".to_string()),
            bank_name: None,
            address: None,
            country_iso2: Some("PL".to_string()),
            country_name: Some("POLAND".to_string()),
        };
        assert_eq!(row.first_missing_required(), Some("NAME"));
        assert!(row.into_record().is_none());
    }
}
