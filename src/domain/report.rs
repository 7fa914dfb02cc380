// ==========================================
// 杂货库存管理系统 - 报表领域模型
// ==========================================
// 用途: 单次请求内计算的统计快照，不缓存、不落库
// ==========================================

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ==========================================
// ReportSection - 可选报表分区
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    StockHealth,
    Department,
    Age,
    PriceRange,
    ShelfLife,
    TopValue,
    TopPrice,
    ReorderTable,
    Expiring,
}

impl ReportSection {
    pub const ALL: [ReportSection; 9] = [
        ReportSection::StockHealth,
        ReportSection::Department,
        ReportSection::Age,
        ReportSection::PriceRange,
        ReportSection::ShelfLife,
        ReportSection::TopValue,
        ReportSection::TopPrice,
        ReportSection::ReorderTable,
        ReportSection::Expiring,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportSection::StockHealth => "stock_health",
            ReportSection::Department => "department",
            ReportSection::Age => "age",
            ReportSection::PriceRange => "price_range",
            ReportSection::ShelfLife => "shelf_life",
            ReportSection::TopValue => "top_value",
            ReportSection::TopPrice => "top_price",
            ReportSection::ReorderTable => "reorder_table",
            ReportSection::Expiring => "expiring",
        }
    }
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        ReportSection::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == key)
            .ok_or_else(|| format!("未知的报表分区: {}", s.trim()))
    }
}

// ==========================================
// ReportFilter - 报表过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    /// 部门过滤（大小写不敏感精确匹配）
    pub department: Option<String>,
    /// 需要计算的分区（空 = 全部）
    pub sections: Vec<ReportSection>,
}

impl ReportFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_department(department: impl Into<String>) -> Self {
        Self {
            department: Some(department.into()),
            sections: Vec::new(),
        }
    }

    /// 实际生效的分区列表（去重、按固定顺序）
    pub fn effective_sections(&self) -> Vec<ReportSection> {
        if self.sections.is_empty() {
            return ReportSection::ALL.to_vec();
        }
        let mut sections = self.sections.clone();
        sections.sort();
        sections.dedup();
        sections
    }

    pub fn includes(&self, section: ReportSection) -> bool {
        self.sections.is_empty() || self.sections.contains(&section)
    }
}

// ==========================================
// 汇总指标
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub total_cost: Decimal,
    pub average_price: Decimal,
    pub average_cost: Decimal,
    pub inventory_value: Decimal,
    pub inventory_cost: Decimal,
    pub profit_margin_pct: Decimal,
    pub recent_sales: usize,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

/// 部门分组统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentBreakdown {
    pub department: String,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_price: Decimal,
    pub total_cost: Decimal,
    pub inventory_value: Decimal,
}

/// 库存健康分布
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockHealth {
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub healthy: usize,
}

/// 区间分布桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

/// 排行榜条目（货值 / 售价）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: i64,
    pub description: String,
    pub department: String,
    pub amount: Decimal,
}

/// 补货清单条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub id: i64,
    pub description: String,
    pub department: String,
    pub quantity: i32,
    pub reorder_point: i32,
}

/// 临期清单条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpiringEntry {
    pub id: i64,
    pub description: String,
    pub department: String,
    pub shelf_life: String,
    pub expires_on: NaiveDate,
    pub days_remaining: i64,
}

// ==========================================
// ReportSnapshot - 报表快照
// ==========================================
// 未选中的分区保持为空（None / 空列表），便于两种表现形式一致输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSnapshot {
    pub generated_on: NaiveDate,
    pub department_filter: Option<String>,
    pub sections: Vec<ReportSection>,
    pub summary: ReportSummary,
    pub departments: Vec<DepartmentBreakdown>,

    pub stock_health: Option<StockHealth>,
    pub department_counts: Option<BTreeMap<String, usize>>,
    pub age_distribution: Option<Vec<Bucket>>,
    pub price_ranges: Option<Vec<Bucket>>,
    pub shelf_life_counts: Option<BTreeMap<String, usize>>,
    pub top_value_items: Vec<RankedItem>,
    pub top_price_items: Vec<RankedItem>,
    pub reorder_items: Vec<ReorderEntry>,
    pub expiring_items: Vec<ExpiringEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_parse() {
        assert_eq!("stock-health".parse::<ReportSection>().unwrap(), ReportSection::StockHealth);
        assert_eq!("TOP_VALUE".parse::<ReportSection>().unwrap(), ReportSection::TopValue);
        assert!("pie_chart".parse::<ReportSection>().is_err());
    }

    #[test]
    fn test_effective_sections_default_all() {
        assert_eq!(ReportFilter::all().effective_sections().len(), ReportSection::ALL.len());

        let filter = ReportFilter {
            department: None,
            sections: vec![ReportSection::TopPrice, ReportSection::Age, ReportSection::TopPrice],
        };
        assert_eq!(
            filter.effective_sections(),
            vec![ReportSection::Age, ReportSection::TopPrice]
        );
        assert!(filter.includes(ReportSection::Age));
        assert!(!filter.includes(ReportSection::Department));
    }
}
