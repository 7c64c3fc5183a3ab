// ==========================================
// SWIFT 代码登记系统 - 批量导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到存储
// 流程: 解析 → 列映射 → 清洗 → 批次内去重 → 库内去重 → 校验 → 关联 → 落库
// 约束:
// - 结构性错误在访问存储之前抛出，整批不写入
// - 行级问题只计数 + warn 日志，不影响整批
// - 库内查询、关联、落库在同一事务内完成
// ==========================================

use crate::config::{config_keys, ImportConfigReader};
use crate::domain::{ImportReport, ImportSummary, RawSwiftCodeRow, SwiftCodeArena};
use crate::importer::conflict_handler::ConflictHandler as ConflictHandlerImpl;
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::dq_validator::DqValidator as DqValidatorImpl;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::{CsvParser, ExcelParser, RawTable, UniversalFileParser};
use crate::importer::hierarchy_linker::{HierarchyLinker, LinkOutcome};
use crate::importer::swift_code_importer_trait::{
    ConflictHandler, DataCleaner, DqValidator, FieldMapper, FileParser, SwiftCodeImporter,
};
use crate::repository::{RepositoryError, SwiftCodeStore, TransactionalStore};
use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SwiftCodeImporterImpl - 批量导入器实现
// ==========================================
pub struct SwiftCodeImporterImpl<S, C>
where
    S: TransactionalStore,
    C: ImportConfigReader,
{
    // 数据访问层
    store: Arc<S>,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    conflict_handler: Box<dyn ConflictHandler>,
    dq_validator: Box<dyn DqValidator>,
}

/// 事务内阶段的产出
struct PersistOutcome {
    head_offices: usize,
    branches: usize,
    link: LinkOutcome,
}

impl<S, C> SwiftCodeImporterImpl<S, C>
where
    S: TransactionalStore,
    C: ImportConfigReader,
{
    /// 创建新的 SwiftCodeImporter 实例
    ///
    /// # 参数
    /// - store: SWIFT 代码存储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - data_cleaner: 数据清洗器
    /// - conflict_handler: 冲突处理器
    /// - dq_validator: DQ 校验器
    pub fn new(
        store: Arc<S>,
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        conflict_handler: Box<dyn ConflictHandler>,
        dq_validator: Box<dyn DqValidator>,
    ) -> Self {
        Self {
            store,
            config,
            file_parser,
            field_mapper,
            data_cleaner,
            conflict_handler,
            dq_validator,
        }
    }

    /// 使用默认组件创建
    pub fn with_default_components(store: Arc<S>, config: C) -> Self {
        Self::new(
            store,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DataCleanerImpl),
            Box::new(ConflictHandlerImpl),
            Box::new(DqValidatorImpl),
        )
    }

    fn link_existing_head_offices(&self) -> ImportResult<bool> {
        self.config
            .link_existing_head_offices()
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::IMPORT_LINK_EXISTING_HEAD_OFFICES.to_string(),
                message: e.to_string(),
            })
    }

    fn sheet_name(&self) -> ImportResult<Option<String>> {
        self.config
            .sheet_name()
            .map_err(|e| ImportError::ConfigReadError {
                key: config_keys::IMPORT_SHEET_NAME.to_string(),
                message: e.to_string(),
            })
    }

    fn import_with_parser(
        &self,
        parser: &dyn FileParser,
        file_path: &Path,
    ) -> ImportResult<ImportReport> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        info!(file_path = %file_path.display(), "开始解析文件");

        let sheet_name = self.sheet_name()?;
        let table = parser
            .parse(file_path, sheet_name.as_deref())
            .map_err(|e| {
                error!(error = %e, "文件解析失败");
                e
            })?;
        info!(
            sheet = table.sheet_name.as_deref().unwrap_or("-"),
            rows = table.rows.len(),
            "文件解析完成"
        );

        self.import_table(table, file_name)
    }

    /// 映射 + 清洗 + 必填检查（不访问存储）
    fn prepare_rows(
        &self,
        table: &RawTable,
        summary: &mut ImportSummary,
    ) -> ImportResult<Vec<RawSwiftCodeRow>> {
        let columns = self.field_mapper.resolve_columns(&table.headers)?;

        let mut rows = Vec::with_capacity(table.rows.len());
        for raw in &table.rows {
            if self.field_mapper.is_empty_row(raw) {
                warn!(row_number = raw.row_number, "跳过空行");
                summary.skipped_empty += 1;
                continue;
            }

            let row = self
                .data_cleaner
                .clean_row(self.field_mapper.map_row(&columns, raw));

            if let Some(column) = row.first_missing_required() {
                warn!(row_number = row.row_number, column = column, "必填字段缺失或不可读，跳过");
                summary.skipped_missing_field += 1;
                continue;
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// 库内去重 → 校验 → 关联 → 落库（在事务视图上执行）
    fn persist_rows(
        &self,
        store: &dyn SwiftCodeStore,
        rows: Vec<RawSwiftCodeRow>,
        link_existing: bool,
        summary: &mut ImportSummary,
    ) -> ImportResult<PersistOutcome> {
        // === 步骤 4: 库内去重 ===
        debug!("步骤 4: 库内去重");
        let mut existing_codes = HashSet::new();
        for code in rows.iter().filter_map(|r| r.swift_code.as_ref()) {
            if store.exists_by_code(code)? {
                existing_codes.insert(code.clone());
            }
        }
        let existing_rows: HashSet<usize> = self
            .conflict_handler
            .detect_cross_batch_duplicates(&rows, &existing_codes)
            .into_iter()
            .map(|(row_number, code)| {
                warn!(row_number = row_number, swift_code = %code, "代码已在库中，跳过");
                row_number
            })
            .collect();
        summary.skipped_existing += existing_rows.len();

        // === 步骤 5: 字段校验 ===
        debug!("步骤 5: 字段校验");
        let mut arena = SwiftCodeArena::new();
        for row in rows {
            if existing_rows.contains(&row.row_number) {
                continue;
            }

            let violations = self.dq_validator.validate_row(&row);
            if !violations.is_empty() {
                for v in &violations {
                    warn!(
                        row_number = v.row_number,
                        swift_code = v.swift_code.as_deref().unwrap_or("-"),
                        field = %v.field,
                        message = %v.message,
                        "字段校验失败，跳过"
                    );
                }
                summary.skipped_invalid += 1;
                continue;
            }

            if let Some(record) = row.into_record() {
                arena.insert(record).map_err(RepositoryError::from)?;
            }
        }
        info!(valid = arena.len(), "字段校验完成");

        // === 步骤 6: 层级关联 ===
        debug!("步骤 6: 层级关联");
        let link = HierarchyLinker::new(link_existing).resolve(&mut arena, store)?;
        info!(
            linked_in_batch = link.linked_in_batch,
            linked_to_existing = link.linked_to_existing,
            adopted_orphans = link.adopted_orphans.len(),
            unlinked = link.unlinked_branches,
            "层级关联完成"
        );

        // === 步骤 7: 落库（总行 → 分行 → 被收养分行）===
        debug!("步骤 7: 落库");
        let (head_offices, branches): (Vec<_>, Vec<_>) = arena
            .into_records()
            .into_iter()
            .partition(|r| r.is_head_office);

        store.save_all(&head_offices)?;
        store.save_all(&branches)?;
        store.save_all(&link.adopted_orphans)?;

        Ok(PersistOutcome {
            head_offices: head_offices.len(),
            branches: branches.len(),
            link,
        })
    }
}

impl<S, C> SwiftCodeImporter for SwiftCodeImporterImpl<S, C>
where
    S: TransactionalStore,
    C: ImportConfigReader,
{
    #[instrument(skip(self))]
    fn import_file(&self, file_path: &Path) -> ImportResult<ImportReport> {
        self.import_with_parser(self.file_parser.as_ref(), file_path)
    }

    #[instrument(skip(self))]
    fn import_from_excel(&self, file_path: &Path) -> ImportResult<ImportReport> {
        self.import_with_parser(&ExcelParser, file_path)
    }

    #[instrument(skip(self))]
    fn import_from_csv(&self, file_path: &Path) -> ImportResult<ImportReport> {
        self.import_with_parser(&CsvParser, file_path)
    }

    #[instrument(skip(self, table), fields(batch_id))]
    fn import_table(
        &self,
        table: RawTable,
        file_name: Option<String>,
    ) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let started_at = Utc::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        info!(batch_id = %batch_id, total_rows = table.rows.len(), "开始导入 SWIFT 代码");

        let mut summary = ImportSummary {
            total_rows: table.rows.len(),
            ..Default::default()
        };

        // === 步骤 1-2: 列映射 + 清洗 ===
        debug!("步骤 1: 列映射与清洗");
        let mut rows = self.prepare_rows(&table, &mut summary)?;
        info!(
            rows = rows.len(),
            skipped_empty = summary.skipped_empty,
            skipped_missing_field = summary.skipped_missing_field,
            "列映射与清洗完成"
        );

        // === 步骤 3: 批次内去重 ===
        debug!("步骤 3: 批次内去重");
        let duplicate_rows: HashSet<usize> = self
            .conflict_handler
            .detect_duplicates(&rows)
            .into_iter()
            .map(|(row_number, code)| {
                warn!(row_number = row_number, swift_code = %code, "批次内重复代码，跳过");
                row_number
            })
            .collect();
        rows.retain(|r| !duplicate_rows.contains(&r.row_number));
        summary.skipped_duplicate = duplicate_rows.len();

        let link_existing = self.link_existing_head_offices()?;

        // === 步骤 4-7: 事务内执行 ===
        let outcome = self
            .store
            .transaction(|store| self.persist_rows(store, rows, link_existing, &mut summary))
            .map_err(|e| {
                error!(error = %e, "导入事务失败，已回滚");
                e
            })?;

        summary.head_offices = outcome.head_offices;
        summary.branches = outcome.branches;
        summary.imported = outcome.head_offices + outcome.branches;
        summary.linked_in_batch = outcome.link.linked_in_batch;
        summary.linked_to_existing = outcome.link.linked_to_existing;
        summary.adopted_orphans = outcome.link.adopted_orphans.len();
        summary.unlinked_branches = outcome.link.unlinked_branches;

        let elapsed_ms = start_time.elapsed().as_millis() as i64;
        info!(
            batch_id = %batch_id,
            total = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped(),
            elapsed_ms = elapsed_ms,
            "SWIFT 代码导入完成"
        );

        Ok(ImportReport {
            batch_id,
            file_name,
            started_at,
            elapsed_ms,
            summary,
        })
    }
}
