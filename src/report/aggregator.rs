// ==========================================
// 杂货库存管理系统 - 报表聚合引擎
// ==========================================
// 职责: 单次遍历商品集合，生成 ReportSnapshot
// 输入: 当前商品（已按部门过滤）、报表过滤条件、报表日期
// 输出: ReportSnapshot（请求级，不缓存）
// ==========================================

use crate::config::ConfigSnapshot;
use crate::domain::item::GroceryItem;
use crate::domain::report::{
    Bucket, DepartmentBreakdown, ExpiringEntry, RankedItem, ReorderEntry, ReportFilter,
    ReportSection, ReportSnapshot, ReportSummary, StockHealth,
};
use crate::domain::types::{normalize_money, round_money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 入库天数分组（上限含）
const AGE_BUCKETS: [(i64, &str); 3] = [(30, "0-30"), (60, "31-60"), (90, "61-90")];
const AGE_OVERFLOW: &str = "90+";

/// 售价区间（上限不含）
const PRICE_BUCKETS: [(i64, &str); 4] = [(5, "$0-5"), (10, "$5-10"), (20, "$10-20"), (50, "$20-50")];
const PRICE_OVERFLOW: &str = "$50+";

// ==========================================
// ReportAggregator - 报表聚合引擎
// ==========================================
// 红线: 无状态引擎，所有方法只读输入
pub struct ReportAggregator {
    top_n: usize,
    recent_sales_days: i64,
}

impl ReportAggregator {
    /// 创建报表聚合引擎
    ///
    /// # 参数
    /// - `top_n`: 排行榜条数
    /// - `recent_sales_days`: "近期售出" 的天数窗口
    pub fn new(top_n: usize, recent_sales_days: i64) -> Self {
        Self {
            top_n,
            recent_sales_days,
        }
    }

    pub fn from_config(config: &ConfigSnapshot) -> Self {
        Self::new(config.report_top_n, config.recent_sales_days)
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成报表快照
    ///
    /// # 参数
    /// - `items`: 参与统计的商品
    /// - `filter`: 过滤条件（部门仅用于回显，过滤由调用方完成）
    /// - `today`: 报表日期
    ///
    /// # 返回
    /// 报表快照；商品为空时各项为零
    pub fn aggregate(
        &self,
        items: &[GroceryItem],
        filter: &ReportFilter,
        today: NaiveDate,
    ) -> ReportSnapshot {
        let sections = filter.effective_sections();
        let wants = |section: ReportSection| sections.contains(&section);

        // 1. 汇总 + 部门分组 + 分布（单次遍历）
        let mut summary = ReportSummary {
            total_price: zero(),
            total_cost: zero(),
            inventory_value: zero(),
            inventory_cost: zero(),
            ..ReportSummary::default()
        };
        let mut departments: BTreeMap<String, DepartmentBreakdown> = BTreeMap::new();
        let mut health = StockHealth::default();
        let mut age_counts = [0usize; AGE_BUCKETS.len() + 1];
        let mut price_counts = [0usize; PRICE_BUCKETS.len() + 1];
        let mut shelf_life_counts: BTreeMap<String, usize> = BTreeMap::new();

        for item in items {
            let value = item.inventory_value();
            let cost = item.inventory_cost();

            summary.item_count += 1;
            summary.total_quantity = summary.total_quantity.saturating_add(i64::from(item.quantity));
            summary.total_price = summary.total_price.saturating_add(item.price);
            summary.total_cost = summary.total_cost.saturating_add(item.cost);
            summary.inventory_value = summary.inventory_value.saturating_add(value);
            summary.inventory_cost = summary.inventory_cost.saturating_add(cost);
            if self.sold_recently(item, today) {
                summary.recent_sales += 1;
            }

            // 部门分组不区分大小写，展示首次出现的写法
            let dept = departments
                .entry(item.department_label().to_lowercase())
                .or_insert_with(|| DepartmentBreakdown {
                    department: item.department_label().to_string(),
                    total_price: zero(),
                    total_cost: zero(),
                    inventory_value: zero(),
                    ..DepartmentBreakdown::default()
                });
            dept.item_count += 1;
            dept.total_quantity = dept.total_quantity.saturating_add(i64::from(item.quantity));
            dept.total_price = dept.total_price.saturating_add(item.price);
            dept.total_cost = dept.total_cost.saturating_add(item.cost);
            dept.inventory_value = dept.inventory_value.saturating_add(value);

            // 库存健康：缺货 / 低库存（不含缺货）/ 健康
            if item.is_out_of_stock() {
                health.out_of_stock += 1;
            } else if item.is_low_stock() {
                health.low_stock += 1;
            } else {
                health.healthy += 1;
            }

            age_counts[age_bucket((today - item.date_added).num_days())] += 1;
            price_counts[price_bucket(item.price)] += 1;
            *shelf_life_counts.entry(item.shelf_life.to_string()).or_insert(0) += 1;
        }

        summary.low_stock_count = health.low_stock + health.out_of_stock;
        summary.out_of_stock_count = health.out_of_stock;
        if summary.item_count > 0 {
            let count = Decimal::from(summary.item_count as u64);
            summary.average_price = round_money(summary.total_price / count);
            summary.average_cost = round_money(summary.total_cost / count);
        } else {
            summary.average_price = zero();
            summary.average_cost = zero();
        }
        summary.profit_margin_pct = profit_margin(summary.inventory_value, summary.inventory_cost);

        // 2. 排行榜
        let top_value_items = if wants(ReportSection::TopValue) {
            self.ranked(items, GroceryItem::inventory_value)
        } else {
            Vec::new()
        };
        let top_price_items = if wants(ReportSection::TopPrice) {
            self.ranked(items, |item| item.price)
        } else {
            Vec::new()
        };
        let reorder_items = if wants(ReportSection::ReorderTable) {
            self.reorder_table(items)
        } else {
            Vec::new()
        };
        let expiring_items = if wants(ReportSection::Expiring) {
            self.expiring(items, today)
        } else {
            Vec::new()
        };

        // 3. 分布
        let departments: Vec<DepartmentBreakdown> = departments.into_values().collect();
        let department_counts = wants(ReportSection::Department).then(|| {
            departments
                .iter()
                .map(|d| (d.department.clone(), d.item_count))
                .collect()
        });
        let stock_health = wants(ReportSection::StockHealth).then_some(health);
        let age_distribution = wants(ReportSection::Age).then(|| {
            buckets(
                AGE_BUCKETS.iter().map(|(_, label)| *label).chain([AGE_OVERFLOW]),
                &age_counts,
            )
        });
        let price_ranges = wants(ReportSection::PriceRange).then(|| {
            buckets(
                PRICE_BUCKETS.iter().map(|(_, label)| *label).chain([PRICE_OVERFLOW]),
                &price_counts,
            )
        });
        let shelf_life_counts = wants(ReportSection::ShelfLife).then_some(shelf_life_counts);

        tracing::debug!(
            item_count = summary.item_count,
            departments = departments.len(),
            "报表聚合完成"
        );

        ReportSnapshot {
            generated_on: today,
            department_filter: filter.department.clone(),
            sections,
            summary,
            departments,
            stock_health,
            department_counts,
            age_distribution,
            price_ranges,
            shelf_life_counts,
            top_value_items,
            top_price_items,
            reorder_items,
            expiring_items,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn sold_recently(&self, item: &GroceryItem, today: NaiveDate) -> bool {
        item.last_sold.is_some_and(|sold| {
            let days = (today - sold).num_days();
            (0..=self.recent_sales_days).contains(&days)
        })
    }

    /// 按金额降序取前 N（金额相同按编号升序）
    fn ranked<F>(&self, items: &[GroceryItem], amount: F) -> Vec<RankedItem>
    where
        F: Fn(&GroceryItem) -> Decimal,
    {
        let mut ranked: Vec<RankedItem> = items
            .iter()
            .map(|item| RankedItem {
                id: item.id,
                description: item.description.clone(),
                department: item.department_label().to_string(),
                amount: amount(item),
            })
            .collect();
        ranked.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.cmp(&b.id)));
        ranked.truncate(self.top_n);
        ranked
    }

    /// 低库存但未缺货，按数量升序
    fn reorder_table(&self, items: &[GroceryItem]) -> Vec<ReorderEntry> {
        let mut entries: Vec<ReorderEntry> = items
            .iter()
            .filter(|item| item.is_low_stock() && !item.is_out_of_stock())
            .map(|item| ReorderEntry {
                id: item.id,
                description: item.description.clone(),
                department: item.department_label().to_string(),
                quantity: item.quantity,
                reorder_point: item.reorder_point,
            })
            .collect();
        entries.sort_by(|a, b| a.quantity.cmp(&b.quantity).then(a.id.cmp(&b.id)));
        entries.truncate(self.top_n);
        entries
    }

    /// 最先到期的商品
    fn expiring(&self, items: &[GroceryItem], today: NaiveDate) -> Vec<ExpiringEntry> {
        // 过期日超出日期范围的商品不参与排序
        let mut entries: Vec<ExpiringEntry> = items
            .iter()
            .filter_map(|item| {
                let expires_on = item.expires_on()?;
                Some(ExpiringEntry {
                    id: item.id,
                    description: item.description.clone(),
                    department: item.department_label().to_string(),
                    shelf_life: item.shelf_life.to_string(),
                    expires_on,
                    days_remaining: (expires_on - today).num_days(),
                })
            })
            .collect();
        entries.sort_by(|a, b| a.expires_on.cmp(&b.expires_on).then(a.id.cmp(&b.id)));
        entries.truncate(self.top_n);
        entries
    }
}

fn zero() -> Decimal {
    normalize_money(Decimal::ZERO)
}

fn age_bucket(days: i64) -> usize {
    AGE_BUCKETS
        .iter()
        .position(|(limit, _)| days <= *limit)
        .unwrap_or(AGE_BUCKETS.len())
}

fn price_bucket(price: Decimal) -> usize {
    PRICE_BUCKETS
        .iter()
        .position(|(limit, _)| price < Decimal::from(*limit))
        .unwrap_or(PRICE_BUCKETS.len())
}

fn buckets<'a>(labels: impl Iterator<Item = &'a str>, counts: &[usize]) -> Vec<Bucket> {
    labels
        .zip(counts.iter())
        .map(|(label, count)| Bucket {
            label: label.to_string(),
            count: *count,
        })
        .collect()
}

/// 毛利率 (%) = (货值 - 成本) / 成本 × 100；成本为 0 时为 0，溢出时饱和
fn profit_margin(value: Decimal, cost: Decimal) -> Decimal {
    if cost.is_zero() {
        return zero();
    }
    let ratio = value
        .saturating_sub(cost)
        .checked_div(cost)
        .unwrap_or(if value >= cost { Decimal::MAX } else { Decimal::MIN });
    round_money(ratio.saturating_mul(Decimal::ONE_HUNDRED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::parse_money;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn item(id: i64, dept: Option<&str>, price: &str, quantity: i32) -> GroceryItem {
        GroceryItem {
            id,
            description: format!("Item {}", id),
            department: dept.map(str::to_string),
            unit: "ea".to_string(),
            shelf_life: "7d".parse().unwrap(),
            price: parse_money(price).unwrap(),
            cost: parse_money("0.50").unwrap(),
            x_for: 1,
            quantity,
            reorder_point: 10,
            last_sold: None,
            date_added: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
        }
    }

    fn aggregator() -> ReportAggregator {
        ReportAggregator::new(10, 30)
    }

    #[test]
    fn test_two_items_two_departments() {
        let items = vec![item(1, Some("produce"), "1.00", 5), item(2, Some("dairy"), "2.50", 5)];

        let snapshot = aggregator().aggregate(&items, &ReportFilter::all(), today());

        assert_eq!(snapshot.summary.item_count, 2);
        assert_eq!(snapshot.summary.total_price.to_string(), "3.50");
        let by_dept: Vec<(String, String)> = snapshot
            .departments
            .iter()
            .map(|d| (d.department.clone(), d.total_price.to_string()))
            .collect();
        assert_eq!(
            by_dept,
            vec![
                ("dairy".to_string(), "2.50".to_string()),
                ("produce".to_string(), "1.00".to_string())
            ]
        );
    }

    #[test]
    fn test_empty_inventory_is_zeroed() {
        let snapshot = aggregator().aggregate(&[], &ReportFilter::all(), today());

        assert_eq!(snapshot.summary.item_count, 0);
        assert_eq!(snapshot.summary.total_price.to_string(), "0.00");
        assert_eq!(snapshot.summary.average_price.to_string(), "0.00");
        assert_eq!(snapshot.summary.profit_margin_pct.to_string(), "0.00");
        assert!(snapshot.departments.is_empty());
        assert_eq!(snapshot.stock_health, Some(StockHealth::default()));
    }

    #[test]
    fn test_department_totals_sum_to_summary() {
        let items = vec![
            item(1, Some("Produce"), "1.99", 3),
            item(2, None, "4.25", 0),
            item(3, Some("Dairy"), "12.00", 40),
            item(4, Some("Produce"), "0.35", 12),
        ];

        let snapshot = aggregator().aggregate(&items, &ReportFilter::all(), today());

        let price: Decimal = snapshot.departments.iter().map(|d| d.total_price).sum();
        let cost: Decimal = snapshot.departments.iter().map(|d| d.total_cost).sum();
        let value: Decimal = snapshot.departments.iter().map(|d| d.inventory_value).sum();
        let count: usize = snapshot.departments.iter().map(|d| d.item_count).sum();
        assert_eq!(price, snapshot.summary.total_price);
        assert_eq!(cost, snapshot.summary.total_cost);
        assert_eq!(value, snapshot.summary.inventory_value);
        assert_eq!(count, snapshot.summary.item_count);
        assert!(snapshot.departments.iter().any(|d| d.department == "Uncategorized"));
    }

    #[test]
    fn test_stock_health_and_reorder_table() {
        let items = vec![
            item(1, None, "1.00", 0),
            item(2, None, "1.00", 8),
            item(3, None, "1.00", 3),
            item(4, None, "1.00", 50),
        ];

        let snapshot = aggregator().aggregate(&items, &ReportFilter::all(), today());

        assert_eq!(
            snapshot.stock_health,
            Some(StockHealth {
                out_of_stock: 1,
                low_stock: 2,
                healthy: 1
            })
        );
        assert_eq!(snapshot.summary.low_stock_count, 3);
        let reorder_ids: Vec<i64> = snapshot.reorder_items.iter().map(|r| r.id).collect();
        assert_eq!(reorder_ids, vec![3, 2]);
    }

    #[test]
    fn test_buckets_and_rankings() {
        let mut old = item(2, None, "55.00", 1);
        old.date_added = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let items = vec![item(1, None, "4.99", 100), old, item(3, None, "5.00", 2)];

        let snapshot = aggregator().aggregate(&items, &ReportFilter::all(), today());

        let prices: Vec<usize> = snapshot.price_ranges.unwrap().iter().map(|b| b.count).collect();
        assert_eq!(prices, vec![1, 1, 0, 0, 1]);
        let ages: Vec<usize> = snapshot.age_distribution.unwrap().iter().map(|b| b.count).collect();
        assert_eq!(ages, vec![2, 0, 0, 1]);
        assert_eq!(snapshot.top_value_items[0].id, 1);
        assert_eq!(snapshot.top_value_items[0].amount.to_string(), "499.00");
        assert_eq!(snapshot.top_price_items[0].id, 2);
        assert_eq!(snapshot.expiring_items[0].id, 2);
    }

    #[test]
    fn test_unselected_sections_stay_empty() {
        let filter = ReportFilter {
            department: None,
            sections: vec![ReportSection::TopPrice],
        };

        let snapshot = aggregator().aggregate(&[item(1, None, "1.00", 1)], &filter, today());

        assert_eq!(snapshot.sections, vec![ReportSection::TopPrice]);
        assert!(snapshot.stock_health.is_none());
        assert!(snapshot.age_distribution.is_none());
        assert!(snapshot.top_value_items.is_empty());
        assert_eq!(snapshot.top_price_items.len(), 1);
        assert_eq!(snapshot.summary.item_count, 1);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let mut huge = item(1, Some("Bulk"), "90000000000000000.00", 2_000_000_000);
        huge.cost = parse_money("0.00").unwrap();
        let mut cheap = item(2, Some("Bulk"), "1.00", 1);
        cheap.cost = parse_money("0.01").unwrap();

        let snapshot = aggregator().aggregate(&[huge, cheap], &ReportFilter::all(), today());

        assert_eq!(snapshot.summary.item_count, 2);
        assert_eq!(snapshot.summary.inventory_cost.to_string(), "0.01");
        assert!(snapshot.summary.profit_margin_pct > Decimal::from(1_000_000_000u64));
        assert_eq!(snapshot.top_value_items[0].id, 1);
    }

    #[test]
    fn test_expiry_beyond_calendar_is_skipped() {
        let mut far = item(1, None, "1.00", 1);
        far.date_added = NaiveDate::MAX;
        let near = item(2, None, "1.00", 1);

        let snapshot = aggregator().aggregate(&[far, near], &ReportFilter::all(), today());

        let ids: Vec<i64> = snapshot.expiring_items.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(snapshot.age_distribution.unwrap()[0].count, 2);
    }

    #[test]
    fn test_departments_group_case_insensitively() {
        let items = vec![
            item(1, Some("Dairy"), "1.00", 1),
            item(2, Some("dairy"), "2.00", 1),
            item(3, Some("Produce"), "3.00", 1),
        ];

        let snapshot = aggregator().aggregate(&items, &ReportFilter::all(), today());

        let names: Vec<(&str, usize)> = snapshot
            .departments
            .iter()
            .map(|d| (d.department.as_str(), d.item_count))
            .collect();
        assert_eq!(names, vec![("Dairy", 2), ("Produce", 1)]);
    }

    #[test]
    fn test_recent_sales_window() {
        let mut recent = item(1, None, "1.00", 1);
        recent.last_sold = NaiveDate::from_ymd_opt(2024, 6, 15);
        let mut stale = item(2, None, "1.00", 1);
        stale.last_sold = NaiveDate::from_ymd_opt(2024, 4, 1);

        let snapshot = aggregator().aggregate(&[recent, stale], &ReportFilter::all(), today());

        assert_eq!(snapshot.summary.recent_sales, 1);
    }
}
