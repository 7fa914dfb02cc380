// ==========================================
// 杂货库存管理系统 - 查询层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("未知的检索字段: {0}")]
    UnknownCriterion(String),

    #[error("检索值非法 ({criterion}={value}): {reason}")]
    InvalidValue {
        criterion: String,
        value: String,
        reason: String,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;
