// ==========================================
// 杂货库存管理系统 - 应用状态
// ==========================================
// 职责: 进程级只读状态（数据库路径、运行环境）
// 说明: 不持有连接；每个请求通过 RequestContext 获取自己的连接
// ==========================================

use crate::app::request_context::RequestContext;
use crate::config::{get_default_db_path, AppEnvironment};
use crate::db::{check_schema_version, init_schema, open_sqlite_connection};
use crate::repository::{RepositoryError, RepositoryResult};

/// 应用状态
#[derive(Debug, Clone)]
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 运行环境
    pub environment: AppEnvironment,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    /// - environment: 运行环境
    pub fn new(db_path: impl Into<String>, environment: AppEnvironment) -> Self {
        let db_path = db_path.into();
        tracing::info!(db_path = %db_path, environment = %environment, "初始化AppState");
        Self {
            db_path,
            environment,
        }
    }

    /// 从环境变量创建（BACKSTOCK_ENV / BACKSTOCK_DB_PATH）
    pub fn from_env() -> Self {
        Self::new(get_default_db_path(), AppEnvironment::from_env())
    }

    /// 初始化数据库（建表幂等）
    ///
    /// # 返回
    /// - Ok(true): schema_version 与代码一致
    pub fn init_database(&self) -> RepositoryResult<bool> {
        if let Some(parent) = std::path::Path::new(&self.db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RepositoryError::DatabaseConnectionError(format!(
                        "无法创建数据库目录 {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn).map_err(|e| RepositoryError::from(e).in_op("init_schema"))?;
        let ok = check_schema_version(&conn).map_err(|e| RepositoryError::from(e).in_op("check_schema"))?;

        tracing::info!(db_path = %self.db_path, schema_ok = ok, "数据库初始化完成");
        Ok(ok)
    }

    /// 开始一个请求
    ///
    /// # 参数
    /// - operation: 请求名称（用于日志）
    pub fn begin_request(&self, operation: &'static str) -> RepositoryResult<RequestContext> {
        RequestContext::open(self, operation)
    }
}
