// ==========================================
// SWIFT 代码登记系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（静态配置）
pub trait ImportConfigReader: Send + Sync {
    /// 是否将未在本批次内关联的分行关联到已入库总行
    /// （并让本批次总行收养已入库孤儿分行）
    ///
    /// # 默认值
    /// - true
    fn link_existing_head_offices(&self) -> Result<bool, Box<dyn Error>>;

    /// 要读取的工作表名称
    ///
    /// # 返回
    /// - None: 读取第一个工作表
    fn sheet_name(&self) -> Result<Option<String>, Box<dyn Error>>;
}

// ==========================================
// ImportSettings - 静态导入配置
// ==========================================
// 用途: 无数据库场景（内存仓储、测试）
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub link_existing_head_offices: bool,
    pub sheet_name: Option<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            link_existing_head_offices: true,
            sheet_name: None,
        }
    }
}

impl ImportSettings {
    /// 仅在批次内关联（不查询已入库总行）
    pub fn batch_scoped() -> Self {
        Self {
            link_existing_head_offices: false,
            ..Self::default()
        }
    }
}

impl ImportConfigReader for ImportSettings {
    fn link_existing_head_offices(&self) -> Result<bool, Box<dyn Error>> {
        Ok(self.link_existing_head_offices)
    }

    fn sheet_name(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self.sheet_name.clone())
    }
}

// 共享配置（AppState 中 ConfigManager 以 Arc 持有）
impl<T: ImportConfigReader + ?Sized> ImportConfigReader for std::sync::Arc<T> {
    fn link_existing_head_offices(&self) -> Result<bool, Box<dyn Error>> {
        (**self).link_existing_head_offices()
    }

    fn sheet_name(&self) -> Result<Option<String>, Box<dyn Error>> {
        (**self).sheet_name()
    }
}
