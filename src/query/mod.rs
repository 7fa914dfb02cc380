// ==========================================
// 杂货库存管理系统 - 检索构建层
// ==========================================
// 职责: 检索字段枚举 → 参数化 SQL
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod criterion;
pub mod error;
pub mod sql_builder;

pub use criterion::{FieldKind, ItemFilter, SearchCriterion};
pub use error::{QueryError, QueryResult};
pub use sql_builder::{CompiledQuery, SqlQueryBuilder};
