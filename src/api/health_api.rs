// ==========================================
// 杂货库存管理系统 - 健康检查API
// ==========================================
// 职责: 数据库可用性、schema 版本、配置与最近导入概况
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::{AppState, RequestContext};
use crate::db::{read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::presentation::{DiagnosticsView, HealthView};
use crate::repository::{ItemImportRepository, ItemImportRepositoryImpl, ItemRepository, RepositoryError};
use std::sync::{Arc, Mutex};
use rusqlite::Connection;

/// 诊断信息中展示的最近批次数
const RECENT_BATCH_LIMIT: usize = 5;

pub struct HealthApi {
    conn: Arc<Mutex<Connection>>,
    state: AppState,
    config: serde_json::Value,
}

impl HealthApi {
    pub fn new(state: &AppState, ctx: &RequestContext) -> ApiResult<Self> {
        Ok(Self {
            conn: ctx.connection(),
            state: state.clone(),
            config: serde_json::to_value(ctx.config())
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        })
    }

    fn schema_version(&self) -> ApiResult<Option<i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(read_schema_version(&conn).map_err(|e| RepositoryError::from(e).in_op("read_schema_version"))?)
    }

    /// 健康检查
    pub fn health(&self) -> ApiResult<HealthView> {
        let schema_version = self.schema_version()?;
        let schema_ok = schema_version == Some(CURRENT_SCHEMA_VERSION);
        let item_count = if schema_ok {
            ItemRepository::from_connection(self.conn.clone()).count()?
        } else {
            0
        };

        Ok(HealthView {
            status: if schema_ok { "ok" } else { "degraded" }.to_string(),
            version: crate::VERSION.to_string(),
            environment: self.state.environment.to_string(),
            schema_version,
            schema_ok,
            item_count,
        })
    }

    /// 诊断信息（健康检查 + 生效配置 + 最近导入批次）
    pub async fn diagnostics(&self) -> ApiResult<DiagnosticsView> {
        let health = self.health()?;
        let recent_batches = if health.schema_ok {
            ItemImportRepositoryImpl::from_connection(self.conn.clone())
                .list_batches(RECENT_BATCH_LIMIT)
                .await?
        } else {
            Vec::new()
        };

        Ok(DiagnosticsView {
            health,
            database_path: self.state.db_path.clone(),
            config: self.config.clone(),
            recent_batches,
        })
    }
}
