// ==========================================
// SWIFT 代码登记系统 - 源文件列名
// ==========================================
// 列名按名称匹配（去除首尾空白，区分大小写），与列顺序无关
// ==========================================

pub const COUNTRY_ISO2_HEADER: &str = "COUNTRY ISO2 CODE";
pub const SWIFT_CODE_HEADER: &str = "SWIFT CODE";
pub const BANK_NAME_HEADER: &str = "NAME";
pub const ADDRESS_HEADER: &str = "ADDRESS";
pub const COUNTRY_NAME_HEADER: &str = "COUNTRY NAME";

/// 必需列（缺任何一列即整批失败）
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COUNTRY_ISO2_HEADER,
    SWIFT_CODE_HEADER,
    BANK_NAME_HEADER,
    COUNTRY_NAME_HEADER,
];
