// ==========================================
// SWIFT 代码登记系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 配置键
pub mod config_keys {
    /// 跨批次关联（bool，默认 true）
    pub const IMPORT_LINK_EXISTING_HEAD_OFFICES: &str = "import.link_existing_head_offices";
    /// 导入工作表名称（默认第一个工作表）
    pub const IMPORT_SHEET_NAME: &str = "import.sheet_name";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 列出全部配置
    pub fn list_configs(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let configs = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(configs)
    }
}

/// 解析布尔配置值
fn parse_bool(key: &str, raw: &str) -> Result<bool, Box<dyn Error>> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("配置值格式错误 (key: {}, value: {})", key, other).into()),
    }
}

impl ImportConfigReader for ConfigManager {
    fn link_existing_head_offices(&self) -> Result<bool, Box<dyn Error>> {
        let key = config_keys::IMPORT_LINK_EXISTING_HEAD_OFFICES;
        let raw = self.get_config_or_default(key, "true")?;
        parse_bool(key, &raw)
    }

    fn sheet_name(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self
            .get_config_value(config_keys::IMPORT_SHEET_NAME)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_connection;

    fn manager() -> ConfigManager {
        let conn = open_in_memory_connection().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = manager();
        assert!(config.link_existing_head_offices().unwrap());
        assert_eq!(config.sheet_name().unwrap(), None);
    }

    #[test]
    fn test_set_and_read_values() {
        let config = manager();
        config
            .set_config_value(config_keys::IMPORT_LINK_EXISTING_HEAD_OFFICES, "off")
            .unwrap();
        config
            .set_config_value(config_keys::IMPORT_SHEET_NAME, " Codes ")
            .unwrap();

        assert!(!config.link_existing_head_offices().unwrap());
        assert_eq!(config.sheet_name().unwrap().as_deref(), Some("Codes"));
        assert_eq!(config.list_configs().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_bool_is_error() {
        let config = manager();
        config
            .set_config_value(config_keys::IMPORT_LINK_EXISTING_HEAD_OFFICES, "maybe")
            .unwrap();
        assert!(config.link_existing_head_offices().is_err());
    }
}
