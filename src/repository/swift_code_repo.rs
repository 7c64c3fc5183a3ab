// ==========================================
// SWIFT 代码登记系统 - SWIFT 代码仓储 Trait
// ==========================================
// 红线: Repository 不含业务规则，只做数据 CRUD
// 存储层保证:
// - swift_code 唯一
// - 删除总行时级联删除其分行
// - find_* 返回的总行记录已填充 branch_codes
// ==========================================

use crate::domain::SwiftCodeRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};

// ==========================================
// SwiftCodeStore Trait
// ==========================================
// 实现者: SqliteSwiftCodeStore（事务内视图）, ArenaStore（内存事务视图）,
//         SwiftCodeRepository / InMemorySwiftCodeStore（每次调用自成事务）
pub trait SwiftCodeStore {
    /// 按代码精确查询
    fn find_by_code(&self, swift_code: &str) -> RepositoryResult<Option<SwiftCodeRecord>>;

    /// 按国家代码精确查询（区分大小写，按代码升序）
    fn find_by_country(&self, country_iso2: &str) -> RepositoryResult<Vec<SwiftCodeRecord>>;

    /// 查询总行当前的全部分行
    fn find_branches(&self, head_office_code: &str) -> RepositoryResult<Vec<SwiftCodeRecord>>;

    /// 查询前缀相同、尚未关联总行的分行
    fn find_orphan_branches(&self, prefix: &str) -> RepositoryResult<Vec<SwiftCodeRecord>>;

    /// 代码是否存在
    fn exists_by_code(&self, swift_code: &str) -> RepositoryResult<bool>;

    /// 插入或更新单条记录（branch_codes 忽略，由 head_office_code 派生）
    fn save(&self, record: &SwiftCodeRecord) -> RepositoryResult<()>;

    /// 批量写入，返回写入条数
    ///
    /// 调用方需保证总行排在引用它的分行之前
    fn save_all(&self, records: &[SwiftCodeRecord]) -> RepositoryResult<usize>;

    /// 删除记录，返回删除条数（含级联删除的分行）
    fn delete(&self, record: &SwiftCodeRecord) -> RepositoryResult<usize>;

    /// 记录总数
    fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// TransactionalStore Trait
// ==========================================
// 用途: 提供原子工作单元；闭包返回 Err 时全部回滚
pub trait TransactionalStore: SwiftCodeStore + Send + Sync {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SwiftCodeStore) -> Result<T, E>,
        E: From<RepositoryError>;
}
