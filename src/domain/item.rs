// ==========================================
// 杂货库存管理系统 - 商品领域模型
// ==========================================
// 对齐: grocery_items 表
// 用途: 仓储层读写、导入层产出、报表层只读
// ==========================================

use crate::domain::types::{cents_to_money, department_label, ShelfLife};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 描述最大长度
pub const DESCRIPTION_MAX_LEN: usize = 60;
/// 部门最大长度
pub const DEPARTMENT_MAX_LEN: usize = 40;
/// 单位最大长度
pub const UNIT_MAX_LEN: usize = 10;
/// 默认补货点
pub const DEFAULT_REORDER_POINT: i32 = 10;
/// 售价 / 成本上限（分）
pub const MONEY_MAX_CENTS: i64 = 99_999_999;
/// 数量 / 补货点上限
pub const QUANTITY_MAX: i32 = 1_000_000;
/// 日期允许的年份范围
pub const DATE_YEAR_RANGE: (i32, i32) = (1900, 9999);

// ==========================================
// GroceryItem - 库存商品
// ==========================================
// 红线: id 唯一且非空; price/cost 非负
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    // ===== 主键 =====
    pub id: i64, // 商品编号

    // ===== 基础信息 =====
    pub description: String,        // 商品描述
    pub department: Option<String>, // 所属部门
    pub unit: String,               // 计量单位（ea/lb/gal ...）
    pub shelf_life: ShelfLife,      // 保质期

    // ===== 价格 =====
    pub price: Decimal, // 售价
    pub cost: Decimal,  // 成本
    pub x_for: i32,     // "x 件售价" 中的 x

    // ===== 库存 =====
    pub quantity: i32,      // 在库数量
    pub reorder_point: i32, // 补货点

    // ===== 时间 =====
    pub last_sold: Option<NaiveDate>, // 最近售出日期
    pub date_added: NaiveDate,        // 入库日期
}

impl GroceryItem {
    /// 库存货值（售价 × 数量，溢出时饱和）
    pub fn inventory_value(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// 库存成本（成本 × 数量，溢出时饱和）
    pub fn inventory_cost(&self) -> Decimal {
        self.cost.saturating_mul(Decimal::from(self.quantity))
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// 低库存（含缺货）
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_point
    }

    /// 预计过期日期（入库日期 + 保质期）；超出日期范围时为 None
    pub fn expires_on(&self) -> Option<NaiveDate> {
        self.date_added
            .checked_add_signed(Duration::days(self.shelf_life.total_days()))
    }

    pub fn department_label(&self) -> &str {
        department_label(self.department.as_deref())
    }

    /// 校验领域不变量
    ///
    /// # 返回
    /// - 空列表: 校验通过
    /// - 非空: 逐字段违规原因
    pub fn violations(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if self.id <= 0 {
            violations.push(FieldViolation::new("id", "编号必须为正整数"));
        }
        if self.description.trim().is_empty() {
            violations.push(FieldViolation::new("description", "描述不能为空"));
        } else if self.description.chars().count() > DESCRIPTION_MAX_LEN {
            violations.push(FieldViolation::new(
                "description",
                format!("描述过长（最多 {} 个字符）", DESCRIPTION_MAX_LEN),
            ));
        }
        if let Some(dept) = &self.department {
            if dept.chars().count() > DEPARTMENT_MAX_LEN {
                violations.push(FieldViolation::new(
                    "department",
                    format!("部门过长（最多 {} 个字符）", DEPARTMENT_MAX_LEN),
                ));
            }
        }
        if self.unit.trim().is_empty() {
            violations.push(FieldViolation::new("unit", "单位不能为空"));
        } else if self.unit.chars().count() > UNIT_MAX_LEN {
            violations.push(FieldViolation::new(
                "unit",
                format!("单位过长（最多 {} 个字符）", UNIT_MAX_LEN),
            ));
        }
        let money_max = cents_to_money(MONEY_MAX_CENTS);
        if self.price.is_sign_negative() && !self.price.is_zero() {
            violations.push(FieldViolation::new("price", "售价不能为负数"));
        } else if self.price > money_max {
            violations.push(FieldViolation::new("price", format!("售价不能超过 {}", money_max)));
        }
        if self.cost.is_sign_negative() && !self.cost.is_zero() {
            violations.push(FieldViolation::new("cost", "成本不能为负数"));
        } else if self.cost > money_max {
            violations.push(FieldViolation::new("cost", format!("成本不能超过 {}", money_max)));
        }
        if self.x_for < 1 {
            violations.push(FieldViolation::new("x_for", "x_for 必须 >= 1"));
        }
        if self.quantity < 0 {
            violations.push(FieldViolation::new("quantity", "数量不能为负数"));
        } else if self.quantity > QUANTITY_MAX {
            violations.push(FieldViolation::new("quantity", format!("数量不能超过 {}", QUANTITY_MAX)));
        }
        if self.reorder_point < 0 {
            violations.push(FieldViolation::new("reorder_point", "补货点不能为负数"));
        } else if self.reorder_point > QUANTITY_MAX {
            violations.push(FieldViolation::new(
                "reorder_point",
                format!("补货点不能超过 {}", QUANTITY_MAX),
            ));
        }
        if let Some(last_sold) = self.last_sold {
            if !date_in_range(last_sold) {
                violations.push(FieldViolation::new("last_sold", date_range_reason()));
            }
        }
        if !date_in_range(self.date_added) {
            violations.push(FieldViolation::new("date_added", date_range_reason()));
        }

        violations
    }
}

fn date_in_range(date: NaiveDate) -> bool {
    (DATE_YEAR_RANGE.0..=DATE_YEAR_RANGE.1).contains(&date.year())
}

fn date_range_reason() -> String {
    format!("日期年份须在 {} ~ {} 之间", DATE_YEAR_RANGE.0, DATE_YEAR_RANGE.1)
}

// ==========================================
// RawItemRecord - 未校验的商品输入
// ==========================================
// 用途: 表单提交与文件导入的共同中间产物
// 生命周期: 仅在单次请求 / 导入流程内
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItemRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub last_sold: Option<String>,
    pub shelf_life: Option<String>,
    pub department: Option<String>,
    pub price: Option<String>,
    pub unit: Option<String>,
    pub x_for: Option<String>,
    pub cost: Option<String>,
    pub quantity: Option<String>,
    pub reorder_point: Option<String>,
    pub date_added: Option<String>,

    // 元信息
    pub row_number: usize, // 原始文件行号（表单提交为 0）
}

// ==========================================
// FieldViolation - 字段级校验违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::parse_money;

    fn sample() -> GroceryItem {
        GroceryItem {
            id: 1,
            description: "Whole Milk".to_string(),
            department: Some("Dairy".to_string()),
            unit: "gal".to_string(),
            shelf_life: "7d".parse().unwrap(),
            price: parse_money("3.49").unwrap(),
            cost: parse_money("2.10").unwrap(),
            x_for: 1,
            quantity: 4,
            reorder_point: 10,
            last_sold: None,
            date_added: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_inventory_value_and_cost() {
        let item = sample();
        assert_eq!(item.inventory_value().to_string(), "13.96");
        assert_eq!(item.inventory_cost().to_string(), "8.40");
    }

    #[test]
    fn test_stock_flags() {
        let mut item = sample();
        assert!(item.is_low_stock());
        assert!(!item.is_out_of_stock());
        item.quantity = 0;
        assert!(item.is_out_of_stock());
        item.quantity = 11;
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_expires_on() {
        let item = sample();
        assert_eq!(item.expires_on(), NaiveDate::from_ymd_opt(2024, 3, 8));

        let mut far = sample();
        far.date_added = NaiveDate::MAX;
        assert_eq!(far.expires_on(), None);
    }

    #[test]
    fn test_upper_bounds() {
        let mut item = sample();
        item.price = parse_money("999999.99").unwrap();
        item.quantity = QUANTITY_MAX;
        assert!(item.violations().is_empty());

        item.price = parse_money("90000000000000000.00").unwrap();
        item.cost = parse_money("1000000.00").unwrap();
        item.quantity = 2_000_000_000;
        item.reorder_point = i32::MAX;
        let fields: Vec<String> = item.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["price", "cost", "quantity", "reorder_point"]);
    }

    #[test]
    fn test_date_year_range() {
        let mut item = sample();
        item.date_added = NaiveDate::from_ymd_opt(262_142, 12, 1).unwrap();
        item.last_sold = NaiveDate::from_ymd_opt(1850, 1, 1);
        let fields: Vec<String> = item.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["last_sold", "date_added"]);

        item.date_added = NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        item.last_sold = NaiveDate::from_ymd_opt(1900, 1, 1);
        assert!(item.violations().is_empty());
    }

    #[test]
    fn test_violations() {
        assert!(sample().violations().is_empty());

        let mut item = sample();
        item.id = 0;
        item.description = String::new();
        item.x_for = 0;
        let fields: Vec<String> = item.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["id", "description", "x_for"]);
    }
}
