// ==========================================
// 杂货库存管理系统 - 商品API
// ==========================================
// 职责: 商品检索、新增、查询、修改、删除
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::RequestContext;
use crate::config::ConfigSnapshot;
use crate::domain::import::OmittedFields;
use crate::domain::item::{GroceryItem, RawItemRecord};
use crate::importer::{DataCleaner, DataCleanerImpl, RowDefaults, RowValidator, RowValidatorImpl};
use crate::presentation::{ItemView, ItemWriteView, SearchView, WriteAction};
use crate::query::ItemFilter;
use crate::repository::ItemRepository;
use chrono::Local;
use tracing::{info, instrument, warn};

/// 商品API
pub struct InventoryApi {
    item_repo: ItemRepository,
    config: ConfigSnapshot,
}

impl InventoryApi {
    /// 创建新的InventoryApi实例（使用请求上下文的连接与配置快照）
    pub fn new(ctx: &RequestContext) -> Self {
        Self {
            item_repo: ItemRepository::from_connection(ctx.connection()),
            config: ctx.config().clone(),
        }
    }

    /// 按检索字段查询商品
    ///
    /// # 参数
    /// - criterion: 检索字段名（支持别名，大小写不敏感）
    /// - value: 检索值
    ///
    /// # 返回
    /// - Ok(SearchView): 按编号升序；无匹配时为空列表
    /// - Err(UnknownCriterion / Validation): 字段未知或值类型不符
    #[instrument(skip(self))]
    pub fn search(&self, criterion: &str, value: &str) -> ApiResult<SearchView> {
        let filter = ItemFilter::parse(criterion, value)?;
        let items = self.item_repo.search(&filter, None)?;

        info!(criterion = %filter.criterion(), matched = items.len(), "商品检索完成");
        Ok(SearchView::new(filter.criterion().as_str(), filter.value(), items))
    }

    /// 新增商品（编号已存在时拒绝）
    #[instrument(skip(self, raw), fields(row_id = ?raw.id))]
    pub fn add_item(&self, raw: RawItemRecord) -> ApiResult<ItemWriteView> {
        let (item, _) = self.validate(raw)?;

        if self.item_repo.exists(item.id)? {
            warn!(id = item.id, "商品编号已存在");
            return Err(ApiError::DuplicateItem(item.id.to_string()));
        }
        self.item_repo.insert(&item)?;

        info!(id = item.id, "商品已新增");
        Ok(ItemWriteView {
            action: WriteAction::Created,
            id: item.id,
            item: Some(item),
        })
    }

    /// 按编号查询
    pub fn get_item(&self, id: i64) -> ApiResult<ItemView> {
        self.item_repo
            .find_by_id(id)?
            .map(|item| ItemView { item })
            .ok_or_else(|| ApiError::NotFound(format!("GroceryItem(id={})不存在", id)))
    }

    /// 修改商品（编号必须已存在）
    ///
    /// 未提供的数量 / 补货点 / 最近售出 / 入库日期保留原值
    #[instrument(skip(self, raw), fields(row_id = ?raw.id))]
    pub fn update_item(&self, raw: RawItemRecord) -> ApiResult<ItemWriteView> {
        let (item, omitted) = self.validate(raw)?;
        self.item_repo.merge(&item, &omitted)?;

        info!(id = item.id, "商品已修改");
        Ok(ItemWriteView {
            action: WriteAction::Updated,
            id: item.id,
            item: self.item_repo.find_by_id(item.id)?,
        })
    }

    /// 删除商品
    #[instrument(skip(self))]
    pub fn delete_item(&self, id: i64) -> ApiResult<ItemWriteView> {
        if !self.item_repo.delete(id)? {
            return Err(ApiError::NotFound(format!("GroceryItem(id={})不存在", id)));
        }

        info!(id = id, "商品已删除");
        Ok(ItemWriteView {
            action: WriteAction::Deleted,
            id,
            item: None,
        })
    }

    /// 表单输入与导入行走同一清洗/校验流程
    fn validate(&self, mut raw: RawItemRecord) -> ApiResult<(GroceryItem, OmittedFields)> {
        DataCleanerImpl.clean_record(&mut raw);
        let defaults = RowDefaults {
            default_reorder_point: self.config.default_reorder_point,
            today: Local::now().date_naive(),
        };
        let item = RowValidatorImpl
            .validate(&raw, &defaults)
            .map_err(ApiError::InvalidItem)?;
        Ok((item, OmittedFields::of(&raw)))
    }
}
