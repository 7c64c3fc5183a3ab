// ==========================================
// SWIFT 代码登记系统 - 总行/分行关联器
// ==========================================
// 阶段 5: 两遍关联
// 1. 构建本批次总行索引（总行代码 → arena 内记录）
// 2. 逐个分行按 前缀 + "XXX" 查索引并建立双向关联
// 跨批次（可配置关闭）:
// 3. 仍未关联的分行查询库中已存在的总行
// 4. 本批次总行收养库中前缀相同的孤儿分行
// 索引只在单次导入内有效，不是进程级状态
// ==========================================

use crate::domain::{SwiftCodeArena, SwiftCodeRecord};
use crate::repository::{RepositoryResult, SwiftCodeStore};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 关联结果
#[derive(Debug, Default)]
pub struct LinkOutcome {
    pub linked_in_batch: usize,
    pub linked_to_existing: usize,
    pub unlinked_branches: usize,
    pub adopted_orphans: Vec<SwiftCodeRecord>, // 需回写的已入库分行
}

pub struct HierarchyLinker {
    link_existing: bool,
}

impl HierarchyLinker {
    pub fn new(link_existing: bool) -> Self {
        Self { link_existing }
    }

    /// 执行全部关联步骤
    pub fn resolve(
        &self,
        arena: &mut SwiftCodeArena,
        store: &dyn SwiftCodeStore,
    ) -> RepositoryResult<LinkOutcome> {
        let mut outcome = LinkOutcome {
            linked_in_batch: self.link_within_batch(arena)?,
            ..Default::default()
        };

        if self.link_existing {
            outcome.linked_to_existing = self.link_to_existing(arena, store)?;
            outcome.adopted_orphans = self.adopt_orphans(arena, store)?;
        }

        outcome.unlinked_branches = arena.iter().filter(|r| r.is_orphan_branch()).count();
        Ok(outcome)
    }

    /// 批次内关联，返回关联的分行数
    pub fn link_within_batch(&self, arena: &mut SwiftCodeArena) -> RepositoryResult<usize> {
        let head_index: HashSet<String> = arena
            .iter()
            .filter(|r| r.is_head_office)
            .map(|r| r.swift_code.clone())
            .collect();

        let candidates: Vec<(String, String)> = arena
            .iter()
            .filter_map(|r| {
                r.candidate_head_office_code()
                    .map(|head| (r.swift_code.clone(), head))
            })
            .collect();

        let mut linked = 0;
        for (branch, head) in candidates {
            if head_index.contains(&head) {
                arena.link(&branch, &head)?;
                debug!(branch = %branch, head_office = %head, "批次内关联");
                linked += 1;
            }
        }
        Ok(linked)
    }

    /// 未关联分行 → 库中已存在的总行，返回关联的分行数
    pub fn link_to_existing(
        &self,
        arena: &mut SwiftCodeArena,
        store: &dyn SwiftCodeStore,
    ) -> RepositoryResult<usize> {
        let orphans: Vec<(String, String)> = arena
            .iter()
            .filter(|r| r.is_orphan_branch())
            .filter_map(|r| {
                r.candidate_head_office_code()
                    .map(|head| (r.swift_code.clone(), head))
            })
            .collect();

        let mut lookups: HashMap<String, Option<SwiftCodeRecord>> = HashMap::new();
        let mut linked = 0;

        for (branch, head_code) in orphans {
            if !lookups.contains_key(&head_code) {
                let found = store
                    .find_by_code(&head_code)?
                    .filter(|r| r.is_head_office);
                lookups.insert(head_code.clone(), found);
            }

            if let Some(Some(head)) = lookups.get(&head_code) {
                arena.attach_external_head(&branch, head)?;
                debug!(branch = %branch, head_office = %head_code, "关联已入库总行");
                linked += 1;
            }
        }
        Ok(linked)
    }

    /// 本批次总行收养库中孤儿分行，返回需回写的分行
    pub fn adopt_orphans(
        &self,
        arena: &SwiftCodeArena,
        store: &dyn SwiftCodeStore,
    ) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        let now = Utc::now();
        let mut adopted = Vec::new();

        for head in arena.iter().filter(|r| r.is_head_office) {
            let Some(prefix) = head.prefix() else {
                continue;
            };
            for mut orphan in store.find_orphan_branches(prefix)? {
                if !orphan.belongs_to(head) || arena.contains(&orphan.swift_code) {
                    continue;
                }
                debug!(branch = %orphan.swift_code, head_office = %head.swift_code, "收养孤儿分行");
                orphan.head_office_code = Some(head.swift_code.clone());
                orphan.updated_at = now;
                adopted.push(orphan);
            }
        }
        Ok(adopted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySwiftCodeStore;

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
    fn test_branch_before_head_office_is_linked() {
        let store = InMemorySwiftCodeStore::new();
        let mut arena = arena_with(&["ABCDPLPW123", "ABCDPLPWXXX", "WXYZDEFF001"]);

        let outcome = HierarchyLinker::new(true).resolve(&mut arena, &store).unwrap();

        assert_eq!(outcome.linked_in_batch, 1);
        assert_eq!(outcome.unlinked_branches, 1);
        assert_eq!(
            arena.get("ABCDPLPWXXX").unwrap().branch_codes,
            vec!["ABCDPLPW123".to_string()]
        );
        arena.check_consistency().unwrap();
    }

    #[test]
    fn test_links_to_persisted_head_office() {
        let store = InMemorySwiftCodeStore::new();
        store.save(&record("ABCDPLPWXXX")).unwrap();
        let mut arena = arena_with(&["ABCDPLPW123", "ABCDPLPW456"]);

        let outcome = HierarchyLinker::new(true).resolve(&mut arena, &store).unwrap();

        assert_eq!(outcome.linked_to_existing, 2);
        assert_eq!(outcome.unlinked_branches, 0);
        assert_eq!(
            arena.get("ABCDPLPW456").unwrap().head_office_code.as_deref(),
            Some("ABCDPLPWXXX")
        );
    }

    #[test]
    fn test_batch_scoped_linking_ignores_store() {
        let store = InMemorySwiftCodeStore::new();
        store.save(&record("ABCDPLPWXXX")).unwrap();
        let mut arena = arena_with(&["ABCDPLPW123"]);

        let outcome = HierarchyLinker::new(false).resolve(&mut arena, &store).unwrap();

        assert_eq!(outcome.linked_to_existing, 0);
        assert_eq!(outcome.unlinked_branches, 1);
    }

    #[test]
    fn test_head_office_adopts_persisted_orphans() {
        let store = InMemorySwiftCodeStore::new();
        store
            .save_all(&[record("ABCDPLPW123"), record("WXYZPLPW123")])
            .unwrap();
        let mut arena = arena_with(&["ABCDPLPWXXX"]);

        let outcome = HierarchyLinker::new(true).resolve(&mut arena, &store).unwrap();

        assert_eq!(outcome.adopted_orphans.len(), 1);
        assert_eq!(outcome.adopted_orphans[0].swift_code, "ABCDPLPW123");
        assert_eq!(
            outcome.adopted_orphans[0].head_office_code.as_deref(),
            Some("ABCDPLPWXXX")
        );
    }
}
