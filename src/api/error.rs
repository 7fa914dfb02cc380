// ==========================================
// 杂货库存管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将各层技术错误转换为用户可理解的错误
// ==========================================

use crate::config::ConfigError;
use crate::domain::item::FieldViolation;
use crate::importer::ImportError;
use crate::presentation::ErrorView;
use crate::query::QueryError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("商品数据校验失败: {}", .0.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; "))]
    InvalidItem(Vec<FieldViolation>),

    #[error("未知的检索字段: {0}")]
    UnknownCriterion(String),

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("商品编号已存在: {0}")]
    DuplicateItem(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    Import(String),

    // ==========================================
    // 数据访问 / 配置错误
    // ==========================================
    #[error("数据库错误 ({op}): {message}")]
    Database { op: String, message: String },

    #[error("配置错误: {0}")]
    Config(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误代码（JSON 错误负载使用）
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } | ApiError::InvalidItem(_) => "validation",
            ApiError::UnknownCriterion(_) => "unknown_criterion",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicateItem(_) => "duplicate_item",
            ApiError::Import(_) => "import",
            ApiError::Database { .. } => "database",
            ApiError::Config(_) => "config",
            ApiError::Internal(_) | ApiError::Other(_) => "internal",
        }
    }

    /// 用户输入导致的错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::Validation { .. }
                | ApiError::InvalidItem(_)
                | ApiError::UnknownCriterion(_)
                | ApiError::NotFound(_)
                | ApiError::DuplicateItem(_)
                | ApiError::Import(_)
        )
    }

    pub fn to_view(&self) -> ErrorView {
        let (field, reasons) = match self {
            ApiError::Validation { field, reason } => (
                Some(field.clone()),
                vec![FieldViolation::new(field.clone(), reason.clone())],
            ),
            ApiError::InvalidItem(violations) => (None, violations.clone()),
            _ => (None, Vec::new()),
        };
        ErrorView {
            error: self.kind().to_string(),
            message: self.to_string(),
            field,
            reasons,
        }
    }
}

// ==========================================
// 从 QueryError 转换
// ==========================================
impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::UnknownCriterion(name) => ApiError::UnknownCriterion(name),
            QueryError::InvalidValue {
                criterion,
                value,
                reason,
            } => ApiError::Validation {
                field: criterion,
                reason: format!("{} (value={})", reason, value),
            },
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        let op = err.operation().unwrap_or("unknown").to_string();
        match err.root() {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateItem(msg.clone()),
            RepositoryError::CheckConstraintViolation(msg) => ApiError::Validation {
                field: "item".to_string(),
                reason: format!("检查约束违反: {}", msg),
            },
            RepositoryError::FieldValueError { field, message } => ApiError::Validation {
                field: field.clone(),
                reason: message.clone(),
            },
            other => ApiError::Database {
                op,
                message: other.to_string(),
            },
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => e.into(),
            ImportError::Config(e) => e.into(),
            ImportError::InternalError(msg) => ApiError::Internal(msg),
            ImportError::Other(e) => ApiError::Other(e),
            other => ApiError::Import(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(key) => ApiError::Validation {
                field: key,
                reason: "未知的配置键".to_string(),
            },
            ConfigError::InvalidValue { key, value, reason } => ApiError::Validation {
                field: key,
                reason: format!("{} (value={})", reason, value),
            },
            other => ApiError::Config(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
