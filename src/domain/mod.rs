// ==========================================
// SWIFT 代码登记系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、层级规则
// 红线: 不含数据访问逻辑
// ==========================================

pub mod columns;
pub mod hierarchy;
pub mod import;
pub mod swift_code;

// 重导出核心类型
pub use hierarchy::{HierarchyError, SwiftCodeArena};
pub use import::{DqViolation, ImportBatch, ImportReport, ImportSummary};
pub use swift_code::{
    code_prefix, head_office_code_for, is_head_office_code, is_valid_country_iso2,
    is_valid_swift_code, RawSwiftCodeRow, SwiftCodeRecord, HEAD_OFFICE_SUFFIX, PREFIX_LEN,
    SWIFT_CODE_LEN,
};
