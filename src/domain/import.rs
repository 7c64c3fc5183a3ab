// ==========================================
// SWIFT 代码登记系统 - 导入领域模型
// ==========================================
// 行级问题只体现在计数和日志中，不会让整批失败
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// DqViolation - 行级校验违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,          // 源文件行号
    pub swift_code: Option<String>, // 代码（如果可解析）
    pub field: String,              // 违规字段
    pub message: String,            // 违规描述
}

// ==========================================
// ImportSummary - 批次计数汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize, // 数据行数（不含表头）
    pub imported: usize,   // 新写入记录数

    // ===== 层级 =====
    pub head_offices: usize,
    pub branches: usize,
    pub linked_in_batch: usize,    // 关联到同批次总行的分行
    pub linked_to_existing: usize, // 关联到已入库总行的分行
    pub adopted_orphans: usize,    // 被本批次总行收养的已入库孤儿分行
    pub unlinked_branches: usize,  // 仍未关联的分行

    // ===== 跳过 =====
    pub skipped_empty: usize,
    pub skipped_missing_field: usize,
    pub skipped_duplicate: usize, // 同批次重复
    pub skipped_existing: usize,  // 已在库中
    pub skipped_invalid: usize,   // 字段校验失败
}

impl ImportSummary {
    /// 被跳过的行总数
    pub fn skipped(&self) -> usize {
        self.skipped_empty
            + self.skipped_missing_field
            + self.skipped_duplicate
            + self.skipped_existing
            + self.skipped_invalid
    }
}

// ==========================================
// ImportReport - 单次导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub summary: ImportSummary,
}

// ==========================================
// ImportBatch - 导入批次记录
// ==========================================
// 对齐: import_batch 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub file_name: Option<String>,
    pub total_rows: i64,
    pub imported_rows: i64,
    pub skipped_rows: i64,
    pub linked_branches: i64,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

impl From<&ImportReport> for ImportBatch {
    fn from(report: &ImportReport) -> Self {
        let summary = &report.summary;
        Self {
            batch_id: report.batch_id.clone(),
            file_name: report.file_name.clone(),
            total_rows: summary.total_rows as i64,
            imported_rows: summary.imported as i64,
            skipped_rows: summary.skipped() as i64,
            linked_branches: (summary.linked_in_batch + summary.linked_to_existing) as i64,
            imported_at: report.started_at,
            elapsed_ms: report.elapsed_ms,
        }
    }
}
