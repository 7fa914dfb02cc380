// ==========================================
// 杂货库存管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型、校验规则
// 红线: 不含数据访问逻辑
// ==========================================

pub mod import;
pub mod item;
pub mod report;
pub mod types;

// 重导出核心类型
pub use import::{
    DuplicatePolicy, ImportBatch, ImportResult, ImportSummary, RowOutcome, RowRejection,
    OmittedFields, RowStatus, ValidatedRow,
};
pub use item::{FieldViolation, GroceryItem, RawItemRecord};
pub use report::{
    Bucket, DepartmentBreakdown, ExpiringEntry, RankedItem, ReorderEntry, ReportFilter, ReportSection,
    ReportSnapshot, ReportSummary, StockHealth,
};
pub use types::{parse_money, ShelfLife, ShelfLifeUnit, UNCATEGORIZED};
