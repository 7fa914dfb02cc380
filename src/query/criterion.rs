// ==========================================
// 杂货库存管理系统 - 检索条件
// ==========================================
// 职责: 固定字段集合 + 检索值 → 过滤谓词（列 + 绑定参数）
// 红线: 列名只来自枚举，用户输入只进入绑定参数
// ==========================================

use crate::domain::types::{money_to_cents, parse_money};
use crate::query::error::{QueryError, QueryResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 字段值类别（决定匹配规则）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Money,
    Text,
    Date,
}

// ==========================================
// SearchCriterion - 可检索字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCriterion {
    Id,
    Description,
    LastSold,
    ShelfLife,
    Department,
    Price,
    Unit,
    XFor,
    Cost,
    Quantity,
    ReorderPoint,
    DateAdded,
}

impl SearchCriterion {
    pub const ALL: [SearchCriterion; 12] = [
        SearchCriterion::Id,
        SearchCriterion::Description,
        SearchCriterion::LastSold,
        SearchCriterion::ShelfLife,
        SearchCriterion::Department,
        SearchCriterion::Price,
        SearchCriterion::Unit,
        SearchCriterion::XFor,
        SearchCriterion::Cost,
        SearchCriterion::Quantity,
        SearchCriterion::ReorderPoint,
        SearchCriterion::DateAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCriterion::Id => "id",
            SearchCriterion::Description => "description",
            SearchCriterion::LastSold => "last_sold",
            SearchCriterion::ShelfLife => "shelf_life",
            SearchCriterion::Department => "department",
            SearchCriterion::Price => "price",
            SearchCriterion::Unit => "unit",
            SearchCriterion::XFor => "x_for",
            SearchCriterion::Cost => "cost",
            SearchCriterion::Quantity => "quantity",
            SearchCriterion::ReorderPoint => "reorder_point",
            SearchCriterion::DateAdded => "date_added",
        }
    }

    /// grocery_items 中对应的列
    pub fn column(&self) -> &'static str {
        match self {
            SearchCriterion::Price => "price_cents",
            SearchCriterion::Cost => "cost_cents",
            other => other.as_str(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            SearchCriterion::Id
            | SearchCriterion::XFor
            | SearchCriterion::Quantity
            | SearchCriterion::ReorderPoint => FieldKind::Integer,
            SearchCriterion::Price | SearchCriterion::Cost => FieldKind::Money,
            SearchCriterion::LastSold | SearchCriterion::DateAdded => FieldKind::Date,
            SearchCriterion::Description
            | SearchCriterion::ShelfLife
            | SearchCriterion::Department
            | SearchCriterion::Unit => FieldKind::Text,
        }
    }
}

impl fmt::Display for SearchCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCriterion {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        let criterion = match key.as_str() {
            "id" | "identifier" | "item_id" => SearchCriterion::Id,
            "description" | "desc" => SearchCriterion::Description,
            "last_sold" | "lastsold" => SearchCriterion::LastSold,
            "shelf_life" | "shelflife" => SearchCriterion::ShelfLife,
            "department" | "dept" => SearchCriterion::Department,
            "price" => SearchCriterion::Price,
            "unit" => SearchCriterion::Unit,
            "x_for" | "xfor" | "quantity_for_price" => SearchCriterion::XFor,
            "cost" => SearchCriterion::Cost,
            "quantity" | "qty" => SearchCriterion::Quantity,
            "reorder_point" | "reorderpoint" => SearchCriterion::ReorderPoint,
            "date_added" | "dateadded" => SearchCriterion::DateAdded,
            _ => return Err(QueryError::UnknownCriterion(s.trim().to_string())),
        };
        Ok(criterion)
    }
}

// ==========================================
// ItemFilter - 编译后的过滤谓词
// ==========================================
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals(Value),
    Like(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemFilter {
    criterion: SearchCriterion,
    value: String,
    predicate: Predicate,
}

impl ItemFilter {
    /// 从字段名与检索值构建过滤条件
    ///
    /// # 错误
    /// - UnknownCriterion: 字段不在固定集合内
    /// - InvalidValue: 值与字段类型不符
    pub fn parse(criterion: &str, value: &str) -> QueryResult<Self> {
        Self::new(criterion.parse()?, value)
    }

    pub fn new(criterion: SearchCriterion, value: &str) -> QueryResult<Self> {
        let trimmed = value.trim();
        let invalid = |reason: &str| QueryError::InvalidValue {
            criterion: criterion.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("检索值不能为空"));
        }

        let predicate = match criterion.kind() {
            FieldKind::Integer => {
                let n = trimmed
                    .parse::<i64>()
                    .map_err(|_| invalid("需要整数"))?;
                if n < 0 {
                    return Err(invalid("需要非负整数"));
                }
                Predicate::Equals(Value::Integer(n))
            }
            FieldKind::Money => {
                let amount = parse_money(trimmed).map_err(|e| invalid(&e))?;
                let cents = money_to_cents(amount).ok_or_else(|| invalid("金额超出范围"))?;
                Predicate::Equals(Value::Integer(cents))
            }
            FieldKind::Text => Predicate::Like(like_pattern(trimmed, true)),
            FieldKind::Date => {
                if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                    Predicate::Equals(Value::Text(date.format("%Y-%m-%d").to_string()))
                } else if trimmed
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, '-' | '*' | '?'))
                {
                    Predicate::Like(like_pattern(trimmed, false))
                } else {
                    return Err(invalid("需要 YYYY-MM-DD 日期或其片段"));
                }
            }
        };

        Ok(Self {
            criterion,
            value: trimmed.to_string(),
            predicate,
        })
    }

    pub fn criterion(&self) -> SearchCriterion {
        self.criterion
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// SQL 条件片段与绑定参数
    pub fn condition(&self) -> (String, Value) {
        let column = self.criterion.column();
        match &self.predicate {
            Predicate::Equals(v) => (format!("{} = ?", column), v.clone()),
            Predicate::Like(p) => (
                format!("{} LIKE ? ESCAPE '\\'", column),
                Value::Text(p.clone()),
            ),
        }
    }
}

/// 检索值 → LIKE 模式
///
/// - `*` 匹配任意串，`?` 匹配单个字符；含通配符时整体匹配
/// - 不含通配符时做子串匹配，且（文本字段）去掉末尾复数 s
/// - 字面量 `%` `_` `\` 转义
fn like_pattern(value: &str, strip_plural: bool) -> String {
    let has_wildcards = value.contains('*') || value.contains('?');

    let mut core = value;
    if !has_wildcards && strip_plural && core.chars().count() > 1 {
        if let Some(stripped) = core.strip_suffix(['s', 'S']) {
            core = stripped;
        }
    }

    let mut pattern = String::with_capacity(core.len() + 2);
    for c in core.chars() {
        match c {
            '\\' => pattern.push_str("\\\\"),
            '%' => pattern.push_str("\\%"),
            '_' => pattern.push_str("\\_"),
            '*' => pattern.push('%'),
            '?' => pattern.push('_'),
            other => pattern.push(other),
        }
    }

    if has_wildcards {
        pattern
    } else {
        format!("%{}%", pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(criterion: &str, value: &str) -> (String, Value) {
        ItemFilter::parse(criterion, value).unwrap().condition()
    }

    #[test]
    fn test_criterion_aliases() {
        assert_eq!("Identifier".parse::<SearchCriterion>().unwrap(), SearchCriterion::Id);
        assert_eq!("last-sold".parse::<SearchCriterion>().unwrap(), SearchCriterion::LastSold);
        assert_eq!("X For".parse::<SearchCriterion>().unwrap(), SearchCriterion::XFor);
        assert!(matches!(
            "colour".parse::<SearchCriterion>(),
            Err(QueryError::UnknownCriterion(_))
        ));
    }

    #[test]
    fn test_integer_criterion() {
        assert_eq!(cond("id", "42"), ("id = ?".to_string(), Value::Integer(42)));
        assert!(ItemFilter::parse("id", "abc").is_err());
        assert!(ItemFilter::parse("x_for", "-1").is_err());
    }

    #[test]
    fn test_money_criterion_matches_cents() {
        assert_eq!(
            cond("price", "$2.50"),
            ("price_cents = ?".to_string(), Value::Integer(250))
        );
        assert!(matches!(
            ItemFilter::parse("price", "cheap"),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_text_pattern_rules() {
        let (sql, value) = cond("description", "apples");
        assert_eq!(sql, "description LIKE ? ESCAPE '\\'");
        assert_eq!(value, Value::Text("%apple%".to_string()));

        assert_eq!(cond("description", "App*").1, Value::Text("App%".to_string()));
        assert_eq!(cond("unit", "l?").1, Value::Text("l_".to_string()));
        assert_eq!(cond("description", "50%_off").1, Value::Text("%50\\%\\_off%".to_string()));
        assert!(ItemFilter::parse("department", "   ").is_err());
    }

    #[test]
    fn test_date_criterion() {
        assert_eq!(
            cond("last_sold", "2024-03-05"),
            ("last_sold = ?".to_string(), Value::Text("2024-03-05".to_string()))
        );
        assert_eq!(cond("date_added", "2024-03").1, Value::Text("%2024-03%".to_string()));
        assert_eq!(cond("last_sold", "2024-*-01").1, Value::Text("2024-%-01".to_string()));
        assert!(ItemFilter::parse("last_sold", "yesterday").is_err());
    }
}
