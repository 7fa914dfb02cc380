// ==========================================
// 杂货库存管理系统 - 商品导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据读写
// ==========================================

use crate::domain::import::{
    DuplicatePolicy, ImportBatch, RowOutcome, RowRejection, ValidatedRow,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ItemImportRepository Trait
// ==========================================
// 实现者: ItemImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ItemImportRepository: Send + Sync {
    // ===== 逐行写入（单事务 + 行级保存点）=====

    /// 写入已校验的行
    ///
    /// # 参数
    /// - rows: 已通过校验的行
    /// - policy: 编号已存在时的处理策略
    ///
    /// # 返回
    /// - Ok(Vec<RowOutcome>): 每行一个结果，顺序与输入一致
    /// - Err: 事务级失败（全部回滚）
    ///
    /// # 说明
    /// - 单行写入失败只回滚该行保存点，并记为 Rejected
    async fn apply_rows(
        &self,
        rows: Vec<ValidatedRow>,
        policy: DuplicatePolicy,
    ) -> RepositoryResult<Vec<RowOutcome>>;

    // ===== 批次记录 =====

    /// 写入导入批次与拒绝明细
    async fn insert_batch(
        &self,
        batch: &ImportBatch,
        rejections: &[RowRejection],
    ) -> RepositoryResult<()>;

    /// 最近的导入批次（按导入时间倒序）
    async fn list_batches(&self, limit: usize) -> RepositoryResult<Vec<ImportBatch>>;

    /// 指定批次的拒绝明细
    async fn get_rejections(&self, batch_id: &str) -> RepositoryResult<Vec<RowRejection>>;
}
