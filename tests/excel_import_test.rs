// ==========================================
// Excel 导入集成测试
// ==========================================
// 测试目标: 验证 .xlsx → SQLite 的导入流程与工作表选择
// 夹具: tests/fixtures/swift_codes_sample.xlsx
//   - Notes:   说明页（无 SWIFT 列）
//   - Codes:   数据页（含数字单元格与错误单元格）
//   - Shifted: 首行为空，表头在第 2 行
// ==========================================


use std::path::Path;
use std::sync::Arc;

use swift_registry::config::{config_keys, ConfigManager};
use swift_registry::importer::{ImportError, SwiftCodeImporter, SwiftCodeImporterImpl};
use swift_registry::logging;
use swift_registry::repository::{SwiftCodeRepository, SwiftCodeStore};
use test_helpers::create_test_db;

const XLSX_FIXTURE: &str = "tests/fixtures/swift_codes_sample.xlsx";

/// 创建读取指定工作表的导入器
fn create_test_importer(
    db_path: &str,
    sheet_name: Option<&str>,
) -> (
    SwiftCodeImporterImpl<SwiftCodeRepository, ConfigManager>,
    Arc<SwiftCodeRepository>,
) {
    let repo = Arc::new(SwiftCodeRepository::new(db_path).expect("Failed to create SwiftCodeRepository"));
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");
    if let Some(sheet) = sheet_name {
        config
            .set_config_value(config_keys::IMPORT_SHEET_NAME, sheet)
            .expect("Failed to set sheet name");
    }
    (
        SwiftCodeImporterImpl::with_default_components(repo.clone(), config),
        repo,
    )
}

#[test]
fn test_import_configured_sheet() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (importer, repo) = create_test_importer(&db_path, Some("Codes"));

    let report = importer.import_file(Path::new(XLSX_FIXTURE)).expect("导入失败");

    let summary = &report.summary;
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.imported, 3);
    assert_eq!(summary.head_offices, 2);
    assert_eq!(summary.linked_in_batch, 1);
    assert_eq!(report.file_name.as_deref(), Some("swift_codes_sample.xlsx"));

    // 数字单元格按文本入库
    let head = repo.find_by_code("ABCDPLPWXXX").unwrap().unwrap();
    assert_eq!(head.address, "12345");
    assert_eq!(head.bank_name, "TEST BANK");
    assert_eq!(head.branch_codes, vec!["ABCDPLPW123".to_string()]);

    let branch = repo.find_by_code("ABCDPLPW123").unwrap().unwrap();
    assert_eq!(branch.country_iso2, "PL");
    assert_eq!(branch.address, "");

    // 错误单元格（#DIV/0!）视为不可读的可选地址
    let german = repo.find_by_code("DEUTDEFFXXX").unwrap().unwrap();
    assert_eq!(german.address, "");
    assert_eq!(german.country_name, "GERMANY");
}

#[test]
fn test_first_sheet_is_read_by_default() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (importer, repo) = create_test_importer(&db_path, None);

    let result = importer.import_file(Path::new(XLSX_FIXTURE));

    assert!(matches!(
        result,
        Err(ImportError::MissingColumn { ref column }) if column == "COUNTRY ISO2 CODE"
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_unknown_sheet_is_structural_error() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (importer, repo) = create_test_importer(&db_path, Some("Missing"));

    let result = importer.import_file(Path::new(XLSX_FIXTURE));

    assert!(matches!(result, Err(ImportError::SheetNotFound(ref name)) if name == "Missing"));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn test_blank_first_row_is_missing_header() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (importer, repo) = create_test_importer(&db_path, Some("Shifted"));

    let result = importer.import_file(Path::new(XLSX_FIXTURE));

    assert!(matches!(result, Err(ImportError::MissingHeaderRow)));
    assert_eq!(repo.count().unwrap(), 0);
}
