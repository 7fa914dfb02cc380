// ==========================================
// 杂货库存管理系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("检查约束违反: {0}")]
    CheckConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量错误 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 操作上下文 =====
    #[error("{op} 失败: {source}")]
    Operation {
        op: &'static str,
        #[source]
        source: Box<RepositoryError>,
    },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 附加操作名称（已附加时保留最内层操作）
    pub fn in_op(self, op: &'static str) -> Self {
        match self {
            already @ RepositoryError::Operation { .. } => already,
            other => RepositoryError::Operation {
                op,
                source: Box::new(other),
            },
        }
    }

    /// 操作名称（未附加时为 None）
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            RepositoryError::Operation { op, .. } => Some(op),
            _ => None,
        }
    }

    /// 去掉操作包装后的根错误
    pub fn root(&self) -> &RepositoryError {
        match self {
            RepositoryError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self.root(), RepositoryError::UniqueConstraintViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), RepositoryError::NotFound { .. })
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("CHECK") {
                    RepositoryError::CheckConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            rusqlite::Error::FromSqlConversionFailure(idx, _, e) => RepositoryError::FieldValueError {
                field: format!("column#{}", idx),
                message: e.to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// 为 Result 附加操作名称
pub trait OperationContext<T> {
    fn op(self, op: &'static str) -> RepositoryResult<T>;
}

impl<T, E> OperationContext<T> for Result<T, E>
where
    E: Into<RepositoryError>,
{
    fn op(self, op: &'static str) -> RepositoryResult<T> {
        self.map_err(|e| e.into().in_op(op))
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
