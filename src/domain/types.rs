// ==========================================
// 杂货库存管理系统 - 领域类型定义
// ==========================================
// 职责: 金额（定点小数）、保质期、部门等基础值类型
// 红线: 金额一律使用 Decimal，禁止浮点
// ==========================================

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 缺失部门时的展示名称
pub const UNCATEGORIZED: &str = "Uncategorized";

/// 金额小数位数（分）
pub const MONEY_SCALE: u32 = 2;

// ==========================================
// 金额工具
// ==========================================

/// 解析金额文本（允许 "$" 前缀与千分位逗号）
///
/// # 返回
/// - Ok(Decimal): scale 固定为 2
/// - Err(String): 失败原因（非数字 / 负数 / 超过两位小数）
pub fn parse_money(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err("金额为空".to_string());
    }

    let value = Decimal::from_str(&cleaned)
        .map_err(|_| format!("无法解析为金额: {}", raw.trim()))?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(format!("金额不能为负数: {}", raw.trim()));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(format!("金额最多两位小数: {}", raw.trim()));
    }

    Ok(normalize_money(value))
}

/// 统一金额 scale 为 2（不做舍入，调用方需保证精度）
pub fn normalize_money(mut value: Decimal) -> Decimal {
    // -0.00 统一为 0.00
    if value.is_zero() {
        value = Decimal::ZERO;
    }
    value.rescale(MONEY_SCALE);
    value
}

/// 四舍五入到分
pub fn round_money(value: Decimal) -> Decimal {
    normalize_money(value.round_dp(MONEY_SCALE))
}

/// Decimal → 分（整数）
pub fn money_to_cents(value: Decimal) -> Option<i64> {
    (round_money(value) * Decimal::ONE_HUNDRED).to_i64()
}

/// 分（整数） → Decimal
pub fn cents_to_money(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

// ==========================================
// 保质期 (Shelf Life)
// ==========================================
// 文本格式: <数量>[d|w|m|y]，纯数字视为天
// 例如: "7d", "2w", "12m", "1y", "14"

/// 保质期单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShelfLifeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl ShelfLifeUnit {
    fn suffix(self) -> char {
        match self {
            ShelfLifeUnit::Days => 'd',
            ShelfLifeUnit::Weeks => 'w',
            ShelfLifeUnit::Months => 'm',
            ShelfLifeUnit::Years => 'y',
        }
    }

    fn days_per_unit(self) -> i64 {
        match self {
            ShelfLifeUnit::Days => 1,
            ShelfLifeUnit::Weeks => 7,
            ShelfLifeUnit::Months => 30,
            ShelfLifeUnit::Years => 365,
        }
    }
}

/// 保质期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShelfLife {
    amount: u32,
    unit: ShelfLifeUnit,
}

impl ShelfLife {
    /// 最大文本长度（与表结构一致）
    pub const MAX_LEN: usize = 5;

    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: ShelfLifeUnit::Days,
        }
    }

    pub fn new(amount: u32, unit: ShelfLifeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn unit(&self) -> ShelfLifeUnit {
        self.unit
    }

    /// 折算为天数（月按 30 天，年按 365 天）
    pub fn total_days(&self) -> i64 {
        i64::from(self.amount) * self.unit.days_per_unit()
    }
}

impl fmt::Display for ShelfLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for ShelfLife {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Err("保质期为空".to_string());
        }
        if value.len() > Self::MAX_LEN {
            return Err(format!("保质期过长（最多 {} 个字符）: {}", Self::MAX_LEN, raw.trim()));
        }

        let (digits, unit) = match value.chars().last() {
            Some('d') => (&value[..value.len() - 1], ShelfLifeUnit::Days),
            Some('w') => (&value[..value.len() - 1], ShelfLifeUnit::Weeks),
            Some('m') => (&value[..value.len() - 1], ShelfLifeUnit::Months),
            Some('y') => (&value[..value.len() - 1], ShelfLifeUnit::Years),
            _ => (value.as_str(), ShelfLifeUnit::Days),
        };

        let amount = digits
            .parse::<u32>()
            .map_err(|_| format!("保质期格式错误，期望如 7d/2w/12m/1y: {}", raw.trim()))?;
        if amount == 0 {
            return Err("保质期必须大于 0".to_string());
        }

        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for ShelfLife {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ShelfLife> for String {
    fn from(value: ShelfLife) -> Self {
        value.to_string()
    }
}

/// 部门展示名称（缺失时归为 Uncategorized）
pub fn department_label(department: Option<&str>) -> &str {
    match department {
        Some(d) if !d.trim().is_empty() => d,
        _ => UNCATEGORIZED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_accepts_symbols() {
        assert_eq!(parse_money("$1,234.5").unwrap().to_string(), "1234.50");
        assert_eq!(parse_money(" 2 ").unwrap().to_string(), "2.00");
        assert_eq!(parse_money("0.99").unwrap(), Decimal::new(99, 2));
    }

    #[test]
    fn test_parse_money_rejects_bad_input() {
        assert!(parse_money("abc").is_err());
        assert!(parse_money("").is_err());
        assert!(parse_money("-1.00").is_err());
        assert!(parse_money("1.005").is_err());
    }

    #[test]
    fn test_parse_money_trailing_zeros_allowed() {
        // 1.500 归一后只有一位小数
        assert_eq!(parse_money("1.500").unwrap().to_string(), "1.50");
    }

    #[test]
    fn test_cents_round_trip() {
        let value = parse_money("12.34").unwrap();
        assert_eq!(money_to_cents(value), Some(1234));
        assert_eq!(cents_to_money(1234), value);
    }

    #[test]
    fn test_shelf_life_parse() {
        assert_eq!("7d".parse::<ShelfLife>().unwrap().total_days(), 7);
        assert_eq!("2W".parse::<ShelfLife>().unwrap().total_days(), 14);
        assert_eq!("1y".parse::<ShelfLife>().unwrap().total_days(), 365);
        assert_eq!("14".parse::<ShelfLife>().unwrap().to_string(), "14d");
        assert!("abc".parse::<ShelfLife>().is_err());
        assert!("0d".parse::<ShelfLife>().is_err());
        assert!("123456".parse::<ShelfLife>().is_err());
    }

    #[test]
    fn test_department_label() {
        assert_eq!(department_label(Some("Dairy")), "Dairy");
        assert_eq!(department_label(Some("  ")), UNCATEGORIZED);
        assert_eq!(department_label(None), UNCATEGORIZED);
    }
}
