// ==========================================
// SWIFT 代码登记系统 - 冲突处理器实现
// ==========================================
// 阶段 3: 检测同批次内重复 / 已在库中的 swift_code
// 策略: 保留第一次出现，其余行跳过
// ==========================================

use crate::domain::RawSwiftCodeRow;
use crate::importer::swift_code_importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::{HashMap, HashSet};

pub struct ConflictHandler;

impl ConflictHandlerTrait for ConflictHandler {
    /// 检测同批次内重复代码
    ///
    /// # 返回
    /// - Vec<(行号, swift_code)>: 重复记录列表（不包括第一次出现）
    fn detect_duplicates(&self, rows: &[RawSwiftCodeRow]) -> Vec<(usize, String)> {
        let mut first_occurrence: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for row in rows {
            if let Some(code) = &row.swift_code {
                if first_occurrence.contains_key(code.as_str()) {
                    duplicates.push((row.row_number, code.clone()));
                } else {
                    first_occurrence.insert(code.as_str(), row.row_number);
                }
            }
        }

        duplicates
    }

    /// 检测已在库中的代码
    fn detect_cross_batch_duplicates(
        &self,
        rows: &[RawSwiftCodeRow],
        existing_codes: &HashSet<String>,
    ) -> Vec<(usize, String)> {
        rows.iter()
            .filter_map(|row| {
                row.swift_code
                    .as_ref()
                    .filter(|code| existing_codes.contains(*code))
                    .map(|code| (row.row_number, code.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, row_number: usize) -> RawSwiftCodeRow {
        RawSwiftCodeRow {
            row_number,
            swift_code: Some(code.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_duplicates_keeps_first_occurrence() {
        let handler = ConflictHandler;
        let rows = vec![
            row("ABCDPLPWXXX", 1),
            row("ABCDPLPW123", 2),
            row("ABCDPLPWXXX", 3),
            row("ABCDPLPWXXX", 4),
        ];

        let duplicates = handler.detect_duplicates(&rows);

        assert_eq!(
            duplicates,
            vec![
                (3, "ABCDPLPWXXX".to_string()),
                (4, "ABCDPLPWXXX".to_string())
            ]
        );
    }

    #[test]
    fn test_detect_existing_codes() {
        let handler = ConflictHandler;
        let rows = vec![row("ABCDPLPWXXX", 1), row("ABCDPLPW123", 2)];
        let existing: HashSet<String> = ["ABCDPLPW123".to_string()].into_iter().collect();

        let duplicates = handler.detect_cross_batch_duplicates(&rows, &existing);

        assert_eq!(duplicates, vec![(2, "ABCDPLPW123".to_string())]);
    }
}
