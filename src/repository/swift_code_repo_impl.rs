// ==========================================
// SWIFT 代码登记系统 - SWIFT 代码仓储实现（rusqlite）
// ==========================================
// 红线: Repository 不含业务规则，只做数据 CRUD
// 说明:
// - branch_codes 不落库，由 head_office_code 反查派生（按 rowid 即写入顺序）
// - 写入使用 ON CONFLICT DO UPDATE，避免 INSERT OR REPLACE 触发级联删除
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::SwiftCodeRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::swift_code_repo::{SwiftCodeStore, TransactionalStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT swift_code, bank_name, address, country_iso2, country_name,
           is_head_office, head_office_code, created_at, updated_at
    FROM swift_codes
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO swift_codes (
        swift_code, bank_name, address, country_iso2, country_name,
        is_head_office, head_office_code, created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(swift_code) DO UPDATE SET
        bank_name = excluded.bank_name,
        address = excluded.address,
        country_iso2 = excluded.country_iso2,
        country_name = excluded.country_name,
        is_head_office = excluded.is_head_office,
        head_office_code = excluded.head_office_code,
        updated_at = excluded.updated_at
"#;

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_row(row: &Row) -> rusqlite::Result<SwiftCodeRecord> {
    Ok(SwiftCodeRecord {
        swift_code: row.get(0)?,
        bank_name: row.get(1)?,
        address: row.get(2)?,
        country_iso2: row.get(3)?,
        country_name: row.get(4)?,
        is_head_office: row.get::<_, i64>(5)? != 0,
        head_office_code: row.get(6)?,
        branch_codes: Vec::new(),
        created_at: parse_timestamp(&row.get::<_, String>(7)?),
        updated_at: parse_timestamp(&row.get::<_, String>(8)?),
    })
}

// ==========================================
// SqliteSwiftCodeStore - 事务内视图
// ==========================================
pub struct SqliteSwiftCodeStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteSwiftCodeStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn branch_codes_of(&self, head_office_code: &str) -> RepositoryResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT swift_code FROM swift_codes WHERE head_office_code = ?1 ORDER BY rowid",
        )?;
        let codes = stmt
            .query_map(params![head_office_code], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(codes)
    }

    fn with_branch_codes(&self, mut record: SwiftCodeRecord) -> RepositoryResult<SwiftCodeRecord> {
        if record.is_head_office {
            record.branch_codes = self.branch_codes_of(&record.swift_code)?;
        }
        Ok(record)
    }

    fn query_records(
        &self,
        where_clause: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        let sql = format!("{} {}", SELECT_COLUMNS, where_clause);
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(args, map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        records
            .into_iter()
            .map(|record| self.with_branch_codes(record))
            .collect()
    }

    fn upsert(&self, record: &SwiftCodeRecord) -> RepositoryResult<()> {
        self.conn.execute(
            UPSERT_SQL,
            params![
                record.swift_code,
                record.bank_name,
                record.address,
                record.country_iso2,
                record.country_name,
                record.is_head_office as i32,
                record.head_office_code,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl SwiftCodeStore for SqliteSwiftCodeStore<'_> {
    fn find_by_code(&self, swift_code: &str) -> RepositoryResult<Option<SwiftCodeRecord>> {
        let sql = format!("{} WHERE swift_code = ?1", SELECT_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![swift_code], map_row)
            .optional()?;

        record.map(|r| self.with_branch_codes(r)).transpose()
    }

    fn find_by_country(&self, country_iso2: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.query_records(
            "WHERE country_iso2 = ?1 ORDER BY swift_code",
            &[&country_iso2],
        )
    }

    fn find_branches(&self, head_office_code: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.query_records(
            "WHERE head_office_code = ?1 ORDER BY rowid",
            &[&head_office_code],
        )
    }

    fn find_orphan_branches(&self, prefix: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.query_records(
            "WHERE head_office_code IS NULL AND is_head_office = 0 \
             AND substr(swift_code, 1, 8) = ?1 ORDER BY rowid",
            &[&prefix],
        )
    }

    fn exists_by_code(&self, swift_code: &str) -> RepositoryResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM swift_codes WHERE swift_code = ?1)",
            params![swift_code],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    fn save(&self, record: &SwiftCodeRecord) -> RepositoryResult<()> {
        self.upsert(record)
    }

    fn save_all(&self, records: &[SwiftCodeRecord]) -> RepositoryResult<usize> {
        let mut stmt = self.conn.prepare(UPSERT_SQL)?;

        let mut count = 0;
        for record in records {
            stmt.execute(params![
                record.swift_code,
                record.bank_name,
                record.address,
                record.country_iso2,
                record.country_name,
                record.is_head_office as i32,
                record.head_office_code,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn delete(&self, record: &SwiftCodeRecord) -> RepositoryResult<usize> {
        // 级联删除的行不计入 changes()，需先统计
        let cascaded: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM swift_codes WHERE head_office_code = ?1",
            params![record.swift_code],
            |row| row.get(0),
        )?;

        let deleted = self.conn.execute(
            "DELETE FROM swift_codes WHERE swift_code = ?1",
            params![record.swift_code],
        )?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SwiftCode".to_string(),
                id: record.swift_code.clone(),
            });
        }

        Ok(deleted + cascaded as usize)
    }

    fn count(&self) -> RepositoryResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ==========================================
// SwiftCodeRepository - SWIFT 代码仓储
// ==========================================
/// SWIFT 代码仓储
/// 职责: 管理 swift_codes 表的 CRUD 操作，提供事务工作单元
/// 红线: 不含业务逻辑，只负责数据访问
pub struct SwiftCodeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SwiftCodeRepository {
    /// 创建新的 SwiftCodeRepository 实例（建表幂等）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

impl TransactionalStore for SwiftCodeRepository {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn SwiftCodeStore) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = {
            let store = SqliteSwiftCodeStore::new(&*tx);
            work(&store)
        };

        match result {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            // Transaction 析构时自动回滚
            Err(e) => Err(e),
        }
    }
}

impl SwiftCodeStore for SwiftCodeRepository {
    fn find_by_code(&self, swift_code: &str) -> RepositoryResult<Option<SwiftCodeRecord>> {
        self.transaction(|store| store.find_by_code(swift_code))
    }

    fn find_by_country(&self, country_iso2: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.transaction(|store| store.find_by_country(country_iso2))
    }

    fn find_branches(&self, head_office_code: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.transaction(|store| store.find_branches(head_office_code))
    }

    fn find_orphan_branches(&self, prefix: &str) -> RepositoryResult<Vec<SwiftCodeRecord>> {
        self.transaction(|store| store.find_orphan_branches(prefix))
    }

    fn exists_by_code(&self, swift_code: &str) -> RepositoryResult<bool> {
        self.transaction(|store| store.exists_by_code(swift_code))
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
        self.transaction(|store| store.count())
    }
}
