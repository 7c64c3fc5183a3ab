// ==========================================
// SWIFT 代码登记系统 - 总行/分行层级 Arena
// ==========================================
// 记录按代码存放，层级关系只保存代码（不持有对方）:
// - 分行.head_office_code = Some(总行代码)
// - 总行.branch_codes 包含分行代码
// 一致性规则: 分行.head_office_code 指向 arena 内总行 ⇔ 该总行.branch_codes 恰好包含分行一次
// 每次 link/unlink 后都会校验受影响的一对记录
// ==========================================

use crate::domain::swift_code::SwiftCodeRecord;
use std::collections::HashMap;
use thiserror::Error;

/// 层级操作错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("代码不存在: {0}")]
    UnknownCode(String),

    #[error("代码重复: {0}")]
    DuplicateCode(String),

    #[error("无效关联: branch={branch}, head_office={head_office}: {reason}")]
    InvalidLink {
        branch: String,
        head_office: String,
        reason: String,
    },

    #[error("分行已关联其他总行: branch={branch}, current={current}")]
    AlreadyLinked { branch: String, current: String },

    #[error("层级不一致: {0}")]
    Inconsistent(String),
}

// ==========================================
// SwiftCodeArena
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SwiftCodeArena {
    records: HashMap<String, SwiftCodeRecord>,
    order: Vec<String>, // 插入顺序
}

impl SwiftCodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&SwiftCodeRecord> {
        self.records.get(code)
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &SwiftCodeRecord> {
        self.order.iter().filter_map(|code| self.records.get(code))
    }

    /// 按插入顺序取出全部记录
    pub fn into_records(mut self) -> Vec<SwiftCodeRecord> {
        self.order
            .iter()
            .filter_map(|code| self.records.remove(code))
            .collect()
    }

    /// 插入一条新记录（清空其层级字段，关联需显式 link）
    pub fn insert(&mut self, mut record: SwiftCodeRecord) -> Result<(), HierarchyError> {
        if self.records.contains_key(&record.swift_code) {
            return Err(HierarchyError::DuplicateCode(record.swift_code));
        }
        record.head_office_code = None;
        record.branch_codes.clear();
        self.order.push(record.swift_code.clone());
        self.records.insert(record.swift_code.clone(), record);
        Ok(())
    }

    /// 插入或更新记录
    ///
    /// - 描述字段以传入值为准
    /// - branch_codes 由 arena 维护，忽略传入值
    /// - head_office_code 变化时先解除旧关联再建立新关联；新总行必须在 arena 内
    pub fn upsert(&mut self, record: SwiftCodeRecord) -> Result<(), HierarchyError> {
        let code = record.swift_code.clone();
        let target_head = record.head_office_code.clone();

        if let Some(head) = &target_head {
            if !self.records.contains_key(head) {
                return Err(HierarchyError::UnknownCode(head.clone()));
            }
        }

        let current_head = match self.records.get_mut(&code) {
            Some(existing) => {
                existing.bank_name = record.bank_name;
                existing.address = record.address;
                existing.country_iso2 = record.country_iso2;
                existing.country_name = record.country_name;
                existing.updated_at = record.updated_at;
                existing.head_office_code.clone()
            }
            None => {
                self.insert(record)?;
                None
            }
        };

        if current_head != target_head {
            if current_head.is_some() {
                self.unlink(&code)?;
            }
            if let Some(head) = target_head {
                self.link(&code, &head)?;
            }
        }
        Ok(())
    }

    /// 建立 分行 → 总行 关联（双向）
    ///
    /// 已关联到同一总行时幂等返回
    pub fn link(&mut self, branch_code: &str, head_code: &str) -> Result<(), HierarchyError> {
        let branch = self
            .records
            .get(branch_code)
            .ok_or_else(|| HierarchyError::UnknownCode(branch_code.to_string()))?;
        let head = self
            .records
            .get(head_code)
            .ok_or_else(|| HierarchyError::UnknownCode(head_code.to_string()))?;

        if !branch.belongs_to(head) {
            return Err(HierarchyError::InvalidLink {
                branch: branch_code.to_string(),
                head_office: head_code.to_string(),
                reason: "前缀不一致或类型不符".to_string(),
            });
        }

        match branch.head_office_code.as_deref() {
            Some(current) if current == head_code => {
                return self.ensure_pair_consistent(branch_code, head_code);
            }
            Some(current) => {
                return Err(HierarchyError::AlreadyLinked {
                    branch: branch_code.to_string(),
                    current: current.to_string(),
                });
            }
            None => {}
        }

        if let Some(branch) = self.records.get_mut(branch_code) {
            branch.head_office_code = Some(head_code.to_string());
        }
        if let Some(head) = self.records.get_mut(head_code) {
            head.branch_codes.push(branch_code.to_string());
        }

        self.ensure_pair_consistent(branch_code, head_code)
    }

    /// 将分行挂到 arena 外部的总行（仅设置单向引用）
    ///
    /// 总行在 arena 内时等价于 link
    pub fn attach_external_head(
        &mut self,
        branch_code: &str,
        head: &SwiftCodeRecord,
    ) -> Result<(), HierarchyError> {
        if self.records.contains_key(&head.swift_code) {
            return self.link(branch_code, &head.swift_code);
        }

        let branch = self
            .records
            .get_mut(branch_code)
            .ok_or_else(|| HierarchyError::UnknownCode(branch_code.to_string()))?;

        if !branch.belongs_to(head) {
            return Err(HierarchyError::InvalidLink {
                branch: branch_code.to_string(),
                head_office: head.swift_code.clone(),
                reason: "前缀不一致或类型不符".to_string(),
            });
        }
        if let Some(current) = &branch.head_office_code {
            return Err(HierarchyError::AlreadyLinked {
                branch: branch_code.to_string(),
                current: current.clone(),
            });
        }

        branch.head_office_code = Some(head.swift_code.clone());
        Ok(())
    }

    /// 解除分行与总行的关联，返回原总行代码
    pub fn unlink(&mut self, branch_code: &str) -> Result<Option<String>, HierarchyError> {
        let branch = self
            .records
            .get_mut(branch_code)
            .ok_or_else(|| HierarchyError::UnknownCode(branch_code.to_string()))?;

        let Some(head_code) = branch.head_office_code.take() else {
            return Ok(None);
        };

        if let Some(head) = self.records.get_mut(&head_code) {
            let before = head.branch_codes.len();
            head.branch_codes.retain(|c| c != branch_code);
            if before - head.branch_codes.len() != 1 {
                return Err(HierarchyError::Inconsistent(format!(
                    "总行 {} 的分行列表中 {} 出现 {} 次",
                    head_code,
                    branch_code,
                    before - head.branch_codes.len()
                )));
            }
        }

        Ok(Some(head_code))
    }

    /// 删除记录；总行级联删除其全部分行，分行先从总行解除关联
    ///
    /// 返回被删除的记录（总行在前）
    pub fn remove(&mut self, code: &str) -> Result<Vec<SwiftCodeRecord>, HierarchyError> {
        if !self.records.contains_key(code) {
            return Err(HierarchyError::UnknownCode(code.to_string()));
        }

        self.unlink(code)?;

        let mut removed = Vec::new();
        if let Some(record) = self.records.remove(code) {
            for branch_code in &record.branch_codes {
                if let Some(branch) = self.records.remove(branch_code) {
                    removed.push(branch);
                }
            }
            removed.insert(0, record);
        }

        self.order.retain(|c| self.records.contains_key(c));
        Ok(removed)
    }

    /// 总行的分行（按关联顺序）
    pub fn branches_of(&self, head_code: &str) -> Vec<&SwiftCodeRecord> {
        self.records
            .get(head_code)
            .map(|head| {
                head.branch_codes
                    .iter()
                    .filter_map(|c| self.records.get(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 全量一致性检查
    pub fn check_consistency(&self) -> Result<(), HierarchyError> {
        for record in self.records.values() {
            if record.is_head_office && record.head_office_code.is_some() {
                return Err(HierarchyError::Inconsistent(format!(
                    "总行 {} 不能引用其他总行",
                    record.swift_code
                )));
            }
            if !record.is_head_office && !record.branch_codes.is_empty() {
                return Err(HierarchyError::Inconsistent(format!(
                    "分行 {} 不能拥有分行",
                    record.swift_code
                )));
            }
            if let Some(head) = &record.head_office_code {
                if self.records.contains_key(head) {
                    self.ensure_pair_consistent(&record.swift_code, head)?;
                }
            }
            for branch_code in &record.branch_codes {
                let branch = self.records.get(branch_code).ok_or_else(|| {
                    HierarchyError::Inconsistent(format!(
                        "总行 {} 的分行 {} 不存在",
                        record.swift_code, branch_code
                    ))
                })?;
                if branch.head_office_code.as_deref() != Some(record.swift_code.as_str()) {
                    return Err(HierarchyError::Inconsistent(format!(
                        "分行 {} 未反向引用总行 {}",
                        branch_code, record.swift_code
                    )));
                }
            }
        }
        Ok(())
    }

    fn ensure_pair_consistent(&self, branch_code: &str, head_code: &str) -> Result<(), HierarchyError> {
        let (Some(branch), Some(head)) = (self.records.get(branch_code), self.records.get(head_code))
        else {
            return Err(HierarchyError::Inconsistent(format!(
                "关联双方缺失: branch={}, head_office={}",
                branch_code, head_code
            )));
        };

        let occurrences = head.branch_codes.iter().filter(|c| *c == branch_code).count();
        let linked = branch.head_office_code.as_deref() == Some(head_code);

        if linked && occurrences == 1 && branch.belongs_to(head) {
            Ok(())
        } else {
            Err(HierarchyError::Inconsistent(format!(
                "branch={} head_office={} linked={} occurrences={}",
                branch_code, head_code, linked, occurrences
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> SwiftCodeRecord {
        SwiftCodeRecord::new(code, "TEST BANK", "", "PL", "POLAND")
    }

    fn arena_with(codes: &[&str]) -> SwiftCodeArena {
        let mut arena = SwiftCodeArena::new();
        for code in codes {
            arena.insert(record(code)).unwrap();
        }
        arena
    }

    #[test]
    fn test_link_sets_both_directions() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();

        assert_eq!(
            arena.get("ABCDPLPW123").unwrap().head_office_code.as_deref(),
            Some("ABCDPLPWXXX")
        );
        assert_eq!(
            arena.get("ABCDPLPWXXX").unwrap().branch_codes,
            vec!["ABCDPLPW123".to_string()]
        );
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();

        assert_eq!(arena.branches_of("ABCDPLPWXXX").len(), 1);
    }

    #[test]
    fn test_link_rejects_prefix_mismatch() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "WXYZPLPW123"]);
        let result = arena.link("WXYZPLPW123", "ABCDPLPWXXX");
        assert!(matches!(result, Err(HierarchyError::InvalidLink { .. })));
    }

    #[test]
    fn test_head_office_never_links_to_itself() {
        let mut arena = arena_with(&["ABCDPLPWXXX"]);
        let result = arena.link("ABCDPLPWXXX", "ABCDPLPWXXX");
        assert!(matches!(result, Err(HierarchyError::InvalidLink { .. })));
    }

    #[test]
    fn test_unlink_removes_membership() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123", "ABCDPLPW456"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();
        arena.link("ABCDPLPW456", "ABCDPLPWXXX").unwrap();

        let previous = arena.unlink("ABCDPLPW123").unwrap();

        assert_eq!(previous.as_deref(), Some("ABCDPLPWXXX"));
        assert_eq!(
            arena.get("ABCDPLPWXXX").unwrap().branch_codes,
            vec!["ABCDPLPW456".to_string()]
        );
        assert!(arena.get("ABCDPLPW123").unwrap().is_orphan_branch());
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_remove_head_office_cascades() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123", "ABCDPLPW456", "WXYZDEFFXXX"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();
        arena.link("ABCDPLPW456", "ABCDPLPWXXX").unwrap();

        let removed = arena.remove("ABCDPLPWXXX").unwrap();

        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].swift_code, "ABCDPLPWXXX");
        assert_eq!(arena.len(), 1);
        assert!(arena.contains("WXYZDEFFXXX"));
    }

    #[test]
    fn test_remove_branch_unlinks_from_head() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();

        let removed = arena.remove("ABCDPLPW123").unwrap();

        assert_eq!(removed.len(), 1);
        assert!(arena.get("ABCDPLPWXXX").unwrap().branch_codes.is_empty());
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_upsert_relinks_and_keeps_branch_list() {
        let mut arena = arena_with(&["ABCDPLPWXXX", "ABCDPLPW123"]);
        arena.link("ABCDPLPW123", "ABCDPLPWXXX").unwrap();

        // 传入的 branch_codes 被忽略
        let mut head = record("ABCDPLPWXXX");
        head.bank_name = "RENAMED".to_string();
        arena.upsert(head).unwrap();

        let stored = arena.get("ABCDPLPWXXX").unwrap();
        assert_eq!(stored.bank_name, "RENAMED");
        assert_eq!(stored.branch_codes, vec!["ABCDPLPW123".to_string()]);

        let mut branch = record("ABCDPLPW123");
        branch.head_office_code = None;
        arena.upsert(branch).unwrap();
        assert!(arena.get("ABCDPLPWXXX").unwrap().branch_codes.is_empty());
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_upsert_rejects_unknown_head() {
        let mut arena = SwiftCodeArena::new();
        let mut branch = record("ABCDPLPW123");
        branch.head_office_code = Some("ABCDPLPWXXX".to_string());

        assert_eq!(
            arena.upsert(branch),
            Err(HierarchyError::UnknownCode("ABCDPLPWXXX".to_string()))
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn test_attach_external_head() {
        let mut arena = arena_with(&["ABCDPLPW123"]);
        let external = record("ABCDPLPWXXX");

        arena.attach_external_head("ABCDPLPW123", &external).unwrap();

        assert_eq!(
            arena.get("ABCDPLPW123").unwrap().head_office_code.as_deref(),
            Some("ABCDPLPWXXX")
        );
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_iteration_keeps_insert_order() {
        let arena = arena_with(&["ABCDPLPW123", "ABCDPLPWXXX", "ABCDPLPW456"]);
        let codes: Vec<_> = arena.iter().map(|r| r.swift_code.as_str()).collect();
        assert_eq!(codes, vec!["ABCDPLPW123", "ABCDPLPWXXX", "ABCDPLPW456"]);
    }
}
