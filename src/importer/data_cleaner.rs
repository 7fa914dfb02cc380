// ==========================================
// 杂货库存管理系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 金额与整数格式整理 / 日期解析
// 说明: 清洗不做校验，校验交给 RowValidator
// ==========================================

use crate::domain::item::RawItemRecord;
use crate::importer::item_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::{Duration, NaiveDate};

/// Excel 日期序列号起点
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            match trimmed.to_uppercase().as_str() {
                "" | "NULL" | "N/A" | "NA" => None,
                _ => Some(trimmed.to_string()),
            }
        })
    }

    fn clean_money(&self, value: &str) -> String {
        value
            .chars()
            .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
            .collect()
    }

    fn clean_integer(&self, value: &str) -> String {
        let compact: String = value
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect();

        // Excel 数字单元格常带 ".0"
        match compact.split_once('.') {
            Some((int_part, frac)) if !int_part.is_empty() && frac.chars().all(|c| c == '0') => {
                int_part.to_string()
            }
            _ => compact,
        }
    }

    fn parse_date(&self, value: &str) -> Result<NaiveDate, String> {
        let value = value.trim();

        // 带时间部分的取日期（"2024-01-02 00:00:00" / "2024-01-02T00:00:00"）
        let date_part = value
            .split([' ', 'T'])
            .next()
            .unwrap_or(value);

        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y%m%d"))
            .or_else(|_| NaiveDate::parse_from_str(date_part, "%m/%d/%Y"))
            .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y/%m/%d"))
        {
            return Ok(date);
        }

        // Excel 日期序列号（带时间部分时为小数，取整数部分）
        let compact = self.clean_integer(value);
        let serial = match compact.split_once('.') {
            Some((days, time)) if time.chars().all(|c| c.is_ascii_digit()) => days.to_string(),
            _ => compact,
        };
        if !serial.is_empty() && serial.len() <= 6 && serial.chars().all(|c| c.is_ascii_digit()) {
            if let (Ok(days), Some(epoch)) = (
                serial.parse::<i64>(),
                NaiveDate::from_ymd_opt(EXCEL_EPOCH.0, EXCEL_EPOCH.1, EXCEL_EPOCH.2),
            ) {
                return Ok(epoch + Duration::days(days));
            }
        }

        Err(format!("无法解析为日期: {}", value))
    }

    fn clean_record(&self, record: &mut RawItemRecord) {
        let text = |v: Option<String>| self.normalize_null(v.map(|s| self.clean_text(&s, false)));

        record.id = text(record.id.take()).map(|v| self.clean_integer(&v));
        record.description = text(record.description.take());
        record.department = text(record.department.take());
        record.unit = text(record.unit.take());
        record.shelf_life = text(record.shelf_life.take()).map(|v| v.to_lowercase());

        record.price = text(record.price.take()).map(|v| self.clean_money(&v));
        record.cost = text(record.cost.take()).map(|v| self.clean_money(&v));

        record.x_for = text(record.x_for.take()).map(|v| self.clean_integer(&v));
        record.quantity = text(record.quantity.take()).map(|v| self.clean_integer(&v));
        record.reorder_point = text(record.reorder_point.take()).map(|v| self.clean_integer(&v));

        record.last_sold = text(record.last_sold.take());
        record.date_added = text(record.date_added.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        assert_eq!(DataCleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(DataCleaner.normalize_null(Some("null".to_string())), None);
        assert_eq!(
            DataCleaner.normalize_null(Some(" Dairy ".to_string())),
            Some("Dairy".to_string())
        );
    }

    #[test]
    fn test_clean_money_and_integer() {
        assert_eq!(DataCleaner.clean_money("$1,234.50"), "1234.50");
        assert_eq!(DataCleaner.clean_integer("1,200"), "1200");
        assert_eq!(DataCleaner.clean_integer("12.0"), "12");
        assert_eq!(DataCleaner.clean_integer("12.5"), "12.5");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(DataCleaner.parse_date("2024-01-02").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("20240102").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("01/02/2024").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("2024-01-02 00:00:00").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("45293").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("45293.5").unwrap(), expected);
        assert_eq!(DataCleaner.parse_date("45293.999988").unwrap(), expected);
        assert!(DataCleaner.parse_date("45293.5x").is_err());
        assert!(DataCleaner.parse_date("yesterday").is_err());
    }

    #[test]
    fn test_clean_record() {
        let mut record = RawItemRecord {
            id: Some(" 7.0 ".to_string()),
            unit: Some("LB".to_string()),
            price: Some("$2.50".to_string()),
            department: Some("".to_string()),
            ..RawItemRecord::default()
        };

        DataCleaner.clean_record(&mut record);

        assert_eq!(record.id.as_deref(), Some("7"));
        assert_eq!(record.unit.as_deref(), Some("LB"));
        assert_eq!(record.price.as_deref(), Some("2.50"));
        assert_eq!(record.department, None);
    }
}
