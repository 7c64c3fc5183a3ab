// ==========================================
// SWIFT 代码登记系统 - 批量导入 API
// ==========================================
// 职责: 封装导入器调用，并在导入成功后记录导入批次
// 批次记录失败只记警告，不影响已提交的导入结果
// ==========================================

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ImportConfigReader;
use crate::domain::{ImportBatch, ImportReport};
use crate::importer::{SwiftCodeImporter, SwiftCodeImporterImpl};
use crate::repository::{ImportBatchRepository, TransactionalStore};

/// 导入API
pub struct ImportApi<S: TransactionalStore, C: ImportConfigReader> {
    importer: SwiftCodeImporterImpl<S, C>,
    batch_repo: Arc<ImportBatchRepository>,
}

impl<S, C> ImportApi<S, C>
where
    S: TransactionalStore,
    C: ImportConfigReader,
{
    pub fn new(importer: SwiftCodeImporterImpl<S, C>, batch_repo: Arc<ImportBatchRepository>) -> Self {
        Self {
            importer,
            batch_repo,
        }
    }

    /// 导入 SWIFT 代码文件
    ///
    /// # 参数
    /// - file_path: 文件路径（.csv / .xlsx / .xls 等）
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入结果（含各类跳过计数）
    /// - Err(ApiError::ImportError): 文件或表头问题，未写入任何记录
    pub fn import_file(&self, file_path: &str) -> ApiResult<ImportReport> {
        let path = file_path.trim();
        if path.is_empty() {
            return Err(ApiError::InvalidFormat("文件路径不能为空".to_string()));
        }

        let report = self.importer.import_file(Path::new(path))?;

        if let Err(e) = self.batch_repo.insert(&ImportBatch::from(&report)) {
            warn!(batch_id = %report.batch_id, error = %e, "导入批次记录写入失败");
        }

        info!(
            batch_id = %report.batch_id,
            imported = report.summary.imported,
            skipped = report.summary.skipped(),
            "文件导入完成"
        );
        Ok(report)
    }

    /// 最近的导入批次（按导入时间倒序）
    pub fn list_recent_batches(&self, limit: usize) -> ApiResult<Vec<ImportBatch>> {
        Ok(self.batch_repo.list_recent(limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportSettings;
    use crate::db::open_in_memory_connection;
    use crate::repository::InMemorySwiftCodeStore;
    use std::io::Write;
    use std::sync::Mutex;

    fn api() -> ImportApi<InMemorySwiftCodeStore, ImportSettings> {
        let store = Arc::new(InMemorySwiftCodeStore::new());
        let importer = SwiftCodeImporterImpl::with_default_components(store, ImportSettings::default());
        let conn = open_in_memory_connection().unwrap();
        let batch_repo = Arc::new(ImportBatchRepository::from_connection(Arc::new(Mutex::new(conn))));
        ImportApi::new(importer, batch_repo)
    }

    #[test]
    fn test_import_records_batch() {
        let api = api();
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "COUNTRY ISO2 CODE,SWIFT CODE,CODE TYPE,NAME,ADDRESS,TOWN NAME,COUNTRY NAME,TIME ZONE").unwrap();
        writeln!(file, "PL,ABCDPLPWXXX,BIC11,Test Bank,ul. Prosta 1,WARSZAWA,Poland,Europe/Warsaw").unwrap();
        writeln!(file, "PL,ABCDPLPW123,BIC11,Test Bank,,WARSZAWA,Poland,Europe/Warsaw").unwrap();
        file.flush().unwrap();

        let report = api.import_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(report.summary.imported, 2);

        let batches = api.list_recent_batches(10).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].batch_id, report.batch_id);
        assert_eq!(batches[0].linked_branches, 1);
    }

    #[test]
    fn test_missing_file_is_import_error() {
        let api = api();
        let result = api.import_file("/nonexistent/codes.csv");
        assert!(matches!(result, Err(ApiError::ImportError(_))));
        assert!(api.list_recent_batches(10).unwrap().is_empty());
    }
}
