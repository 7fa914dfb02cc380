// ==========================================
// 杂货库存管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 库存检索 / 批量导入 / 统计报表
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 查询层 - 检索字段与 SQL 构建
pub mod query;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 报表层 - 统计聚合
pub mod report;

// 表现层 - HTML / JSON
pub mod presentation;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 请求上下文
pub mod app;

// 演示数据
pub mod demo;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    DuplicatePolicy, GroceryItem, ImportResult, RawItemRecord, ReportFilter, ReportSection,
    ReportSnapshot, ShelfLife,
};

// 查询
pub use query::{ItemFilter, SearchCriterion};

// API
pub use api::{ApiError, ConfigApi, HealthApi, ImportApi, InventoryApi, ReportApi};

// 应用层
pub use app::{AppState, RequestContext};

// 表现层
pub use presentation::Representation;

// ==========================================
// 系统常量
// ==========================================

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "backstock";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(APP_NAME, "backstock");
    }
}
