// ==========================================
// 杂货库存管理系统 - 行校验器实现
// ==========================================
// 职责: RawItemRecord → GroceryItem
// 规则: 逐字段收集违规原因，不因单个字段失败而提前返回
// ==========================================

use crate::domain::item::{FieldViolation, GroceryItem, RawItemRecord};
use crate::domain::types::{parse_money, ShelfLife};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::item_importer_trait::{
    DataCleaner as DataCleanerTrait, RowDefaults, RowValidator as RowValidatorTrait,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub struct RowValidator;

/// 单行校验过程中的违规收集器
struct Collector {
    violations: Vec<FieldViolation>,
}

impl Collector {
    fn required<'a>(&mut self, field: &str, value: &'a Option<String>) -> Option<&'a str> {
        match value.as_deref() {
            Some(v) => Some(v),
            None => {
                self.violations.push(FieldViolation::new(field, "必填字段缺失"));
                None
            }
        }
    }

    fn record<T>(&mut self, field: &str, parsed: Result<T, String>) -> Option<T> {
        match parsed {
            Ok(v) => Some(v),
            Err(reason) => {
                self.violations.push(FieldViolation::new(field, reason));
                None
            }
        }
    }
}

fn parse_int(value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .map_err(|_| format!("无法解析为整数: {}", value))
}

fn parse_id(value: &str) -> Result<i64, String> {
    value
        .parse::<i64>()
        .map_err(|_| format!("无法解析为整数: {}", value))
}

impl RowValidatorTrait for RowValidator {
    fn validate(
        &self,
        record: &RawItemRecord,
        defaults: &RowDefaults,
    ) -> Result<GroceryItem, Vec<FieldViolation>> {
        let mut c = Collector {
            violations: Vec::new(),
        };
        let cleaner = DataCleaner;

        // ===== 必填字段 =====
        let id = c
            .required("id", &record.id)
            .and_then(|v| c.record("id", parse_id(v)));
        let description = c.required("description", &record.description).map(str::to_string);
        let shelf_life = c
            .required("shelf_life", &record.shelf_life)
            .and_then(|v| c.record("shelf_life", v.parse::<ShelfLife>()));
        let price = c
            .required("price", &record.price)
            .and_then(|v| c.record("price", parse_money(v)));
        let unit = c.required("unit", &record.unit).map(str::to_string);
        let x_for = c
            .required("x_for", &record.x_for)
            .and_then(|v| c.record("x_for", parse_int(v)));
        let cost = c
            .required("cost", &record.cost)
            .and_then(|v| c.record("cost", parse_money(v)));

        // ===== 可选字段 =====
        let quantity = match record.quantity.as_deref() {
            Some(v) => c.record("quantity", parse_int(v)),
            None => Some(0),
        };
        let reorder_point = match record.reorder_point.as_deref() {
            Some(v) => c.record("reorder_point", parse_int(v)),
            None => Some(defaults.default_reorder_point),
        };
        let last_sold: Option<Option<NaiveDate>> = match record.last_sold.as_deref() {
            Some(v) => c.record("last_sold", cleaner.parse_date(v)).map(Some),
            None => Some(None),
        };
        let date_added = match record.date_added.as_deref() {
            Some(v) => c.record("date_added", cleaner.parse_date(v)),
            None => Some(defaults.today),
        };

        // 解析失败的字段用占位值构建，再补充领域不变量违规
        let item = GroceryItem {
            id: id.unwrap_or(1),
            description: description.clone().unwrap_or_else(|| "-".to_string()),
            department: record.department.clone(),
            unit: unit.clone().unwrap_or_else(|| "-".to_string()),
            shelf_life: shelf_life.unwrap_or_else(|| ShelfLife::days(1)),
            price: price.unwrap_or(Decimal::ZERO),
            cost: cost.unwrap_or(Decimal::ZERO),
            x_for: x_for.unwrap_or(1),
            quantity: quantity.unwrap_or(0),
            reorder_point: reorder_point.unwrap_or(0),
            last_sold: last_sold.flatten(),
            date_added: date_added.unwrap_or(defaults.today),
        };

        let already_reported: Vec<String> =
            c.violations.iter().map(|v| v.field.clone()).collect();
        c.violations.extend(
            item.violations()
                .into_iter()
                .filter(|v| !already_reported.contains(&v.field)),
        );

        if c.violations.is_empty() {
            Ok(item)
        } else {
            Err(c.violations)
        }
    }

    fn item_id(&self, record: &RawItemRecord) -> Option<i64> {
        record.id.as_deref().and_then(|v| parse_id(v).ok())
    }
}
