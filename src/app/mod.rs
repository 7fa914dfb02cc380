// ==========================================
// 杂货库存管理系统 - 应用层
// ==========================================
// 职责: 进程状态与请求级上下文
// ==========================================

pub mod request_context;
pub mod state;

// 重导出
pub use request_context::RequestContext;
pub use state::AppState;
