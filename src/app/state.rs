// ==========================================
// SWIFT 代码登记系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 所有仓储共用同一个 SQLite 连接
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, SwiftCodeApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::SwiftCodeImporterImpl;
use crate::repository::{ImportBatchRepository, SwiftCodeRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// SWIFT 代码 API
    pub swift_code_api: Arc<SwiftCodeApi<SwiftCodeRepository>>,

    /// 批量导入 API
    pub import_api: Arc<ImportApi<SwiftCodeRepository, Arc<ConfigManager>>>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化Repository
    /// 3. 创建API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已初始化的连接创建（测试使用内存库）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let swift_code_repo = Arc::new(SwiftCodeRepository::from_connection(conn.clone()));
        let batch_repo = Arc::new(ImportBatchRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let swift_code_api = Arc::new(SwiftCodeApi::new(swift_code_repo.clone()));

        let importer =
            SwiftCodeImporterImpl::with_default_components(swift_code_repo, config_manager.clone());
        let import_api = Arc::new(ImportApi::new(importer, batch_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            swift_code_api,
            import_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 SWIFT_REGISTRY_DB_PATH
/// 2. 用户数据目录/swift-registry/swift_registry.db
/// 3. ./swift_registry.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("SWIFT_REGISTRY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./swift_registry.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("swift-registry");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("swift_registry.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CreateSwiftCodeRequest;
    use crate::config::config_keys;
    use crate::db::open_in_memory_connection;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_apis_share_connection() {
        let conn = Arc::new(Mutex::new(open_in_memory_connection().unwrap()));
        let state = AppState::from_connection(":memory:".to_string(), conn).unwrap();

        state
            .swift_code_api
            .create_swift_code(&CreateSwiftCodeRequest {
                address: None,
                bank_name: "test bank".to_string(),
                country_iso2: "PL".to_string(),
                country_name: "Poland".to_string(),
                is_head_office: true,
                swift_code: "ABCDPLPWXXX".to_string(),
            })
            .unwrap();
        assert!(state.swift_code_api.get_swift_code("ABCDPLPWXXX").is_ok());

        state
            .config_manager
            .set_config_value(config_keys::IMPORT_LINK_EXISTING_HEAD_OFFICES, "false")
            .unwrap();
        assert!(state.import_api.list_recent_batches(5).unwrap().is_empty());
    }
}
