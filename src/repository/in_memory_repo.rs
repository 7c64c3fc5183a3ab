// ==========================================
// SWIFT 代码登记系统 - 内存仓储（基于 SwiftCodeArena）
// ==========================================
// 用途: 无数据库场景与单元测试
// 事务: 锁定 arena → 在副本上执行 → 成功则整体替换，失败则丢弃副本
// 只读查询直接在加锁的 arena 上执行
// ==========================================

use crate::domain::{SwiftCodeArena, SwiftCodeRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::swift_code_repo::{SwiftCodeStore, TransactionalStore};
use std::cell::RefCell;
use std::sync::Mutex;

// ==========================================
// 只读查询（ArenaStore 与 InMemorySwiftCodeStore 共用）
// ==========================================
fn country_records(arena: &SwiftCodeArena, country_iso2: &str) -> Vec<SwiftCodeRecord> {
    let mut records: Vec<_> = arena
        .iter()
        .filter(|r| r.country_iso2 == country_iso2)
        .cloned()
        .collect();
    records.sort_by(|a, b| a.swift_code.cmp(&b.swift_code));
    records
}

fn branch_records(arena: &SwiftCodeArena, head_office_code: &str) -> Vec<SwiftCodeRecord> {
    arena
        .branches_of(head_office_code)
        .into_iter()
        .cloned()
        .collect()
}

fn orphan_records(arena: &SwiftCodeArena, prefix: &str) -> Vec<SwiftCodeRecord> {
    arena
        .iter()
        .filter(|r| r.is_orphan_branch() && r.prefix() == Some(prefix))
        .cloned()
        .collect()
}

// ==========================================
// ArenaStore - 内存事务视图
// ==========================================
pub struct ArenaStore {
    arena: RefCell<SwiftCodeArena>,
}

impl ArenaStore {
    pub fn new(arena: SwiftCodeArena) -> Self {
        Self {
            arena: RefCell::new(arena),
        }
    }

    pub fn into_arena(self) -> SwiftCodeArena {
        self.arena.into_inner()
    }
}

impl SwiftCodeStore for ArenaStore {
    fn find_by_code(&self, swift_code: &str) -> RepositoryResult<Option<SwiftCodeRecord>> {
        Ok(self.arena.borrow().get(swift_code).cloned())
    }

    fn find_by_country(&self, country_iso2: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        Ok(country_records(&self.arena.borrow(), country_iso2))
    }

    fn find_branches(&self, head_office_code: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        Ok(branch_records(&self.arena.borrow(), head_office_code))
    }

    fn find_orphan_branches(&self, prefix: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        Ok(orphan_records(&self.arena.borrow(), prefix))
    }

    fn exists_by_code(&self, swift_code: &str) -> RepositoryResult<bool> {
        Ok(self.arena.borrow().contains(swift_code))
    }

    fn save(&self, record: &SwiftCodeRecord) -> RepositoryResult<()> {
        self.arena.borrow_mut().upsert(record.clone())?;
        Ok(())
    }

    fn save_all(&self, records: &[SwiftCodeRecord]) -> RepositoryResult<usize> {
        let mut arena = self.arena.borrow_mut();
        for record in records {
            arena.upsert(record.clone())?;
        }
        Ok(records.len())
    }

    fn delete(&self, record: &SwiftCodeRecord) -> RepositoryResult<usize> {
        let mut arena = self.arena.borrow_mut();
        if !arena.contains(&record.swift_code) {
            return Err(RepositoryError::NotFound {
                entity: "SwiftCode".to_string(),
                id: record.swift_code.clone(),
            });
        }
        Ok(arena.remove(&record.swift_code)?.len())
    }

    fn count(&self) -> RepositoryResult<usize> {
        Ok(self.arena.borrow().len())
    }
}

// ==========================================
// InMemorySwiftCodeStore
// ==========================================
#[derive(Default)]
pub struct InMemorySwiftCodeStore {
    arena: Mutex<SwiftCodeArena>,
}

impl InMemorySwiftCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前 arena 的一致性检查
    pub fn check_consistency(&self) -> RepositoryResult<()> {
        self.read(|arena| arena.check_consistency())??;
        Ok(())
    }

    /// 只读访问：直接在加锁的 arena 上执行，不复制
    fn read<T>(&self, f: impl FnOnce(&SwiftCodeArena) -> T) -> RepositoryResult<T> {
        let arena = self
            .arena
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(f(&arena))
    }
}

impl TransactionalStore for InMemorySwiftCodeStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SwiftCodeStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self
            .arena
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let scratch = ArenaStore::new(guard.clone());
        let value = work(&scratch)?;

        let arena = scratch.into_arena();
        arena.check_consistency().map_err(RepositoryError::from)?;
        *guard = arena;
        Ok(value)
    }
}

impl SwiftCodeStore for InMemorySwiftCodeStore {
    fn find_by_code(&self, swift_code: &str) -> RepositoryResult<Option<SwiftCodeRecord>> {
        self.read(|arena| arena.get(swift_code).cloned())
    }

    fn find_by_country(&self, country_iso2: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.read(|arena| country_records(arena, country_iso2))
    }

    fn find_branches(&self, head_office_code: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.read(|arena| branch_records(arena, head_office_code))
    }

    fn find_orphan_branches(&self, prefix: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.read(|arena| orphan_records(arena, prefix))
    }

    fn exists_by_code(&self, swift_code: &str) -> RepositoryResult<bool> {
        self.read(|arena| arena.contains(swift_code))
    }

    fn save(&self, record: &SwiftCodeRecord) -> RepositoryResult<()> {
        self.transaction(|store| store.save(record))
    }

    fn save_all(&self, records: &[SwiftCodeRecord]) -> RepositoryResult<usize> {
        self.transaction(|store| store.save_all(records))
    }

    fn delete(&self, record: &SwiftCodeRecord) -> RepositoryResult<usize> {
        self.transaction(|store| store.delete(record))
    }

    fn count(&self) -> RepositoryResult<usize> {
        self.read(|arena| arena.len())
    }
}
