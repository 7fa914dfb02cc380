// ==========================================
// 杂货库存管理系统 - 商品导入API
// ==========================================
// 职责: 封装商品导入相关功能（文件 / 上传 / 批次查询）
// ==========================================

use crate::api::error::ApiResult;
use crate::app::RequestContext;
use crate::config::ConfigSnapshot;
use crate::domain::import::ImportResult;
use crate::importer::{ItemImporter, ItemImporterImpl, Upload};
use crate::presentation::{BatchListView, RejectionListView};
use crate::repository::{ItemImportRepository, ItemImportRepositoryImpl};
use futures::future::join_all;
use std::path::Path;
use tracing::info;

/// 导入API
pub struct ImportApi {
    importer: ItemImporterImpl<ItemImportRepositoryImpl, ConfigSnapshot>,
    import_repo: ItemImportRepositoryImpl,
}

impl ImportApi {
    /// 创建新的ImportApi实例（使用请求上下文的连接与配置快照）
    pub fn new(ctx: &RequestContext) -> Self {
        let importer = ItemImporterImpl::with_default_stages(
            ItemImportRepositoryImpl::from_connection(ctx.connection()),
            ctx.config().clone(),
        );
        Self {
            importer,
            import_repo: ItemImportRepositoryImpl::from_connection(ctx.connection()),
        }
    }

    /// 导入单个文件
    ///
    /// # 返回
    /// - Ok(ImportResult): 逐行结果 + 汇总
    /// - Err(ApiError::Import): 文件级错误
    pub async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ApiResult<ImportResult> {
        Ok(self.importer.import_file(file_path).await?)
    }

    /// 导入多个文件（互不影响，结果顺序与输入一致）
    pub async fn import_files<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<ApiResult<ImportResult>> {
        let results = join_all(file_paths.into_iter().map(|path| self.import_file(path))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(files = results.len(), failed = failed, "批量导入完成");
        results
    }

    /// 导入内存上传
    pub async fn import_upload(&self, upload: Upload) -> ApiResult<ImportResult> {
        Ok(self.importer.import_upload(upload).await?)
    }

    /// 最近的导入批次
    pub async fn list_batches(&self, limit: usize) -> ApiResult<BatchListView> {
        let batches = self.import_repo.list_batches(limit).await?;
        info!(count = batches.len(), "查询导入批次");
        Ok(BatchListView { batches })
    }

    /// 指定批次的拒绝明细
    pub async fn get_rejections(&self, batch_id: &str) -> ApiResult<RejectionListView> {
        let rejections = self.import_repo.get_rejections(batch_id).await?;
        Ok(RejectionListView {
            batch_id: batch_id.to_string(),
            rejections,
        })
    }
}
