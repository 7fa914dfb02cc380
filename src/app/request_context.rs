// ==========================================
// 杂货库存管理系统 - 请求上下文
// ==========================================
// 职责: 单个请求的作用域资源
// - 请求 ID 与 tracing span
// - 独立的 SQLite 连接（drop 时释放）
// - 配置快照（请求开始时读取一次）
// ==========================================

use crate::app::state::AppState;
use crate::config::{ConfigManager, ConfigSnapshot};
use crate::db::open_sqlite_connection;
use crate::repository::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::Span;
use uuid::Uuid;

pub struct RequestContext {
    request_id: String,
    operation: &'static str,
    span: Span,
    conn: Arc<Mutex<Connection>>,
    config: ConfigSnapshot,
    started_at: Instant,
}

impl RequestContext {
    /// 打开请求上下文
    pub fn open(state: &AppState, operation: &'static str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(&state.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(conn, operation)
    }

    /// 使用已有连接（测试与内存数据库）
    pub fn from_connection(conn: Connection, operation: &'static str) -> RepositoryResult<Self> {
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("request", request_id = %request_id, op = operation);
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(conn.clone())
            .config_snapshot()
            .map_err(|e| RepositoryError::Other(anyhow::anyhow!("读取配置失败: {}", e)))?;

        span.in_scope(|| tracing::debug!("请求开始"));

        Ok(Self {
            request_id,
            operation,
            span,
            conn,
            config,
            started_at: Instant::now(),
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// 本请求的连接（仓储共享同一连接）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }

    pub fn config_manager(&self) -> ConfigManager {
        ConfigManager::from_connection(self.conn.clone())
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        let elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        self.span.in_scope(|| {
            tracing::debug!(op = self.operation, elapsed_ms = elapsed_ms, "请求结束");
        });
    }
}
