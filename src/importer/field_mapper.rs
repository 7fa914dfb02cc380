// ==========================================
// 杂货库存管理系统 - 字段映射器实现
// ==========================================
// 职责: 表头别名 → 标准字段
// 规则: 表头统一小写，空格/连字符视为下划线，未知列忽略
// ==========================================

use crate::domain::item::RawItemRecord;
use crate::importer::item_importer_trait::{FieldMapper as FieldMapperTrait, ParsedRow};
use std::collections::HashMap;

/// 必需列（标准名）
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "id",
    "description",
    "shelf_life",
    "price",
    "unit",
    "x_for",
    "cost",
];

/// 标准字段的可接受列名
fn aliases(field: &str) -> &'static [&'static str] {
    match field {
        "id" => &["id", "item_id", "identifier", "itemid", "item_no"],
        "description" => &["description", "desc", "item_description", "name"],
        "last_sold" => &["last_sold", "lastsold", "last_sold_date"],
        "shelf_life" => &["shelf_life", "shelflife"],
        "department" => &["department", "dept"],
        "price" => &["price", "retail_price", "sell_price"],
        "unit" => &["unit", "uom", "unit_of_measure"],
        "x_for" => &["x_for", "xfor", "quantity_for_price"],
        "cost" => &["cost", "unit_cost"],
        "quantity" => &["quantity", "qty", "on_hand"],
        "reorder_point" => &["reorder_point", "reorder", "reorder_level"],
        "date_added" => &["date_added", "added", "dateadded"],
        _ => &[],
    }
}

/// 表头标准化
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_to_raw_item(&self, row: &ParsedRow) -> RawItemRecord {
        let normalized: HashMap<String, &str> = row
            .fields
            .iter()
            .map(|(k, v)| (normalize_header(k), v.as_str()))
            .collect();

        RawItemRecord {
            // 主键
            id: self.get_string(&normalized, "id"),

            // 基础信息
            description: self.get_string(&normalized, "description"),
            department: self.get_string(&normalized, "department"),
            unit: self.get_string(&normalized, "unit"),
            shelf_life: self.get_string(&normalized, "shelf_life"),

            // 价格
            price: self.get_string(&normalized, "price"),
            cost: self.get_string(&normalized, "cost"),
            x_for: self.get_string(&normalized, "x_for"),

            // 库存
            quantity: self.get_string(&normalized, "quantity"),
            reorder_point: self.get_string(&normalized, "reorder_point"),

            // 时间
            last_sold: self.get_string(&normalized, "last_sold"),
            date_added: self.get_string(&normalized, "date_added"),

            // 元信息
            row_number: row.row_number,
        }
    }

    fn missing_required_columns(&self, headers: &[String]) -> Vec<String> {
        let present: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        REQUIRED_COLUMNS
            .iter()
            .filter(|field| {
                !aliases(field)
                    .iter()
                    .any(|alias| present.iter().any(|h| h == alias))
            })
            .map(|field| field.to_string())
            .collect()
    }
}

impl FieldMapper {
    /// 提取字段，按别名顺序取第一个非空值
    fn get_string(&self, row: &HashMap<String, &str>, field: &str) -> Option<String> {
        for alias in aliases(field) {
            if let Some(v) = row.get(*alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }
}
