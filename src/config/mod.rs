// ==========================================
// 杂货库存管理系统 - 配置层
// ==========================================
// 职责: 运行环境、系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod environment;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult, ConfigSnapshot};
pub use environment::{get_default_db_path, AppEnvironment};
pub use import_config_trait::ImportConfigReader;
