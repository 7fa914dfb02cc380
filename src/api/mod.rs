// ==========================================
// 杂货库存管理系统 - API层
// ==========================================
// 职责: 面向调用方的业务接口（CLI / 嵌入方）
// 约定: 每个 API 由 RequestContext 构建，随请求结束释放
// ==========================================

pub mod config_api;
pub mod error;
pub mod health_api;
pub mod import_api;
pub mod inventory_api;
pub mod report_api;

pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use health_api::HealthApi;
pub use import_api::ImportApi;
pub use inventory_api::InventoryApi;
pub use report_api::{parse_sections, ReportApi};
