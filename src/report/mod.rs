// ==========================================
// 杂货库存管理系统 - 报表层
// ==========================================
// 职责: 库存统计聚合（只读、请求级）
// 红线: 不写库、不缓存
// ==========================================

pub mod aggregator;

pub use aggregator::ReportAggregator;
