// ==========================================
// 杂货库存管理系统 - 商品导入 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::import::{
    DuplicatePolicy, ImportBatch, RowOutcome, RowRejection, RowStatus, ValidatedRow,
};
use crate::domain::item::FieldViolation;
use crate::repository::error::{OperationContext, RepositoryError, RepositoryResult};
use crate::repository::item_import_repo::ItemImportRepository;
use crate::repository::item_repo::{insert_item, item_exists, merge_item};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

/// 单行写入
///
/// # 返回
/// - Ok(Some(status)): 已写入
/// - Ok(None): 编号重复且策略为拒绝
fn write_row(
    conn: &Connection,
    row: &ValidatedRow,
    policy: DuplicatePolicy,
) -> RepositoryResult<Option<RowStatus>> {
    let item = &row.item;
    let exists = item_exists(conn, item.id)?;
    match (exists, policy) {
        (true, DuplicatePolicy::Reject) => Ok(None),
        (true, DuplicatePolicy::Upsert) => {
            merge_item(conn, item, &row.omitted)?;
            Ok(Some(RowStatus::Updated))
        }
        (false, _) => {
            insert_item(conn, item)?;
            Ok(Some(RowStatus::Inserted))
        }
    }
}

fn map_batch_row(row: &Row) -> rusqlite::Result<ImportBatch> {
    let policy_raw: String = row.get(2)?;
    let duplicate_policy = policy_raw
        .parse::<DuplicatePolicy>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;

    Ok(ImportBatch {
        batch_id: row.get(0)?,
        file_name: row.get(1)?,
        duplicate_policy,
        total_rows: row.get(3)?,
        inserted_rows: row.get(4)?,
        updated_rows: row.get(5)?,
        rejected_rows: row.get(6)?,
        imported_at: row.get(7)?,
        elapsed_ms: row.get(8)?,
    })
}

// ==========================================
// ItemImportRepositoryImpl
// ==========================================
pub struct ItemImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ItemImportRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl ItemImportRepository for ItemImportRepositoryImpl {
    async fn apply_rows(
        &self,
        rows: Vec<ValidatedRow>,
        policy: DuplicatePolicy,
    ) -> RepositoryResult<Vec<RowOutcome>> {
        let mut conn = self.get_conn()?;
        let mut tx = conn.transaction().op("begin_import")?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            let item_id = row.item.id;
            let sp = tx.savepoint().op("savepoint")?;

            match write_row(&sp, &row, policy) {
                Ok(Some(status)) => {
                    sp.commit().op("release_savepoint")?;
                    outcomes.push(RowOutcome::accepted(row.row_number, item_id, status));
                }
                Ok(None) => {
                    drop(sp);
                    outcomes.push(RowOutcome::rejected(
                        row.row_number,
                        Some(item_id),
                        vec![FieldViolation::new("id", format!("编号重复: {}", item_id))],
                    ));
                }
                Err(e) => {
                    // 保存点随 drop 回滚，只影响本行
                    drop(sp);
                    tracing::warn!(
                        row_number = row.row_number,
                        item_id = item_id,
                        error = %e,
                        "行写入失败，已回滚该行"
                    );
                    outcomes.push(RowOutcome::rejected(
                        row.row_number,
                        Some(item_id),
                        vec![FieldViolation::new("row", format!("写入失败: {}", e))],
                    ));
                }
            }
        }

        tx.commit().op("commit_import")?;
        Ok(outcomes)
    }

    async fn insert_batch(
        &self,
        batch: &ImportBatch,
        rejections: &[RowRejection],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction().op("begin_insert_batch")?;

        tx.execute(
            r#"
            INSERT INTO import_batch (
                batch_id, file_name, duplicate_policy, total_rows, inserted_rows,
                updated_rows, rejected_rows, imported_at, elapsed_ms
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                batch.batch_id,
                batch.file_name,
                batch.duplicate_policy.to_string(),
                batch.total_rows,
                batch.inserted_rows,
                batch.updated_rows,
                batch.rejected_rows,
                batch.imported_at,
                batch.elapsed_ms,
            ],
        )
        .op("insert_batch")?;

        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO import_rejection (batch_id, row_number, item_id, field, reason)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .op("insert_rejection")?;
            for rejection in rejections {
                stmt.execute(params![
                    rejection.batch_id,
                    rejection.row_number as i64,
                    rejection.item_id,
                    rejection.field,
                    rejection.reason,
                ])
                .op("insert_rejection")?;
            }
        }

        tx.commit().op("commit_insert_batch")?;
        Ok(())
    }

    async fn list_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT batch_id, file_name, duplicate_policy, total_rows, inserted_rows,
                       updated_rows, rejected_rows, imported_at, elapsed_ms
                FROM import_batch
                ORDER BY imported_at DESC
                LIMIT ?1
                "#,
            )
            .op("list_batches")?;
        let batches = stmt
            .query_map(params![limit as i64], map_batch_row)
            .op("list_batches")?
            .collect::<Result<Vec<_>, _>>()
            .op("list_batches")?;
        Ok(batches)
    }

    async fn get_rejections(&self, batch_id: &str) -> RepositoryResult<Vec<RowRejection>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare(
                r#"
                SELECT batch_id, row_number, item_id, field, reason
                FROM import_rejection
                WHERE batch_id = ?1
                ORDER BY row_number, rejection_id
                "#,
            )
            .op("get_rejections")?;
        let rejections = stmt
            .query_map(params![batch_id], |row| {
                Ok(RowRejection {
                    batch_id: row.get(0)?,
                    row_number: row.get::<_, i64>(1)? as usize,
                    item_id: row.get(2)?,
                    field: row.get(3)?,
                    reason: row.get(4)?,
                })
            })
            .op("get_rejections")?
            .collect::<Result<Vec<_>, _>>()
            .op("get_rejections")?;
        Ok(rejections)
    }
}
