// ==========================================
// SWIFT 代码登记系统 - 核心库
// ==========================================
// 职责: SWIFT/BIC 代码登记、总行/分行层级维护、批量导入
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录、层级与导入模型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{ImportBatch, ImportReport, ImportSummary, SwiftCodeArena, SwiftCodeRecord};

// 仓储
pub use repository::{InMemorySwiftCodeStore, SwiftCodeRepository};

// 导入
pub use importer::{SwiftCodeImporter, SwiftCodeImporterImpl};

// API
pub use api::{ApiError, ImportApi, SwiftCodeApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "SWIFT 代码登记系统";
