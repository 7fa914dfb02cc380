// ==========================================
// 杂货库存管理系统 - 报表API
// ==========================================
// 职责: 读取商品 → 聚合 → 渲染
// 红线: 只读，每次请求重新计算
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::app::RequestContext;
use crate::domain::report::{ReportFilter, ReportSection, ReportSnapshot};
use crate::presentation::{render, Rendered, Representation};
use crate::report::ReportAggregator;
use crate::repository::ItemRepository;
use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

/// 解析报表分区名称
///
/// # 错误
/// - Validation(field="section"): 未知分区
pub fn parse_sections<S: AsRef<str>>(names: &[S]) -> ApiResult<Vec<ReportSection>> {
    names
        .iter()
        .map(|name| {
            name.as_ref()
                .parse::<ReportSection>()
                .map_err(|reason| ApiError::Validation {
                    field: "section".to_string(),
                    reason,
                })
        })
        .collect()
}

/// 报表API
pub struct ReportApi {
    item_repo: ItemRepository,
    aggregator: ReportAggregator,
}

impl ReportApi {
    pub fn new(ctx: &RequestContext) -> Self {
        Self {
            item_repo: ItemRepository::from_connection(ctx.connection()),
            aggregator: ReportAggregator::from_config(ctx.config()),
        }
    }

    /// 生成报表（报表日期为今天）
    pub fn generate(&self, filter: &ReportFilter) -> ApiResult<ReportSnapshot> {
        self.generate_on(filter, Local::now().date_naive())
    }

    /// 生成指定日期的报表
    #[instrument(skip(self))]
    pub fn generate_on(&self, filter: &ReportFilter, today: NaiveDate) -> ApiResult<ReportSnapshot> {
        let items = self.item_repo.list_by_department(filter.department.as_deref())?;
        let snapshot = self.aggregator.aggregate(&items, filter, today);

        info!(
            item_count = snapshot.summary.item_count,
            total_price = %snapshot.summary.total_price,
            "报表生成完成"
        );
        Ok(snapshot)
    }

    /// 生成并渲染
    pub fn render(&self, filter: &ReportFilter, representation: Representation) -> ApiResult<Rendered> {
        let snapshot = self.generate(filter)?;
        render(&snapshot, representation).map_err(|e| ApiError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let sections = parse_sections(&["age", "top-value"]).unwrap();
        assert_eq!(sections, vec![ReportSection::Age, ReportSection::TopValue]);

        let err = parse_sections(&["age", "pie"]).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
