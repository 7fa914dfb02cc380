// ==========================================
// 杂货库存管理系统 - 导入领域模型
// ==========================================
// 对齐: import_batch / import_rejection 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::item::{FieldViolation, GroceryItem, RawItemRecord};

// ==========================================
// DuplicatePolicy - 重复编号处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// 更新已存在记录
    #[default]
    Upsert,
    /// 拒绝重复行
    Reject,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::Upsert => write!(f, "upsert"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upsert" | "update" => Ok(DuplicatePolicy::Upsert),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("未知的重复处理策略: {}", other)),
        }
    }
}

// ==========================================
// RowStatus / RowOutcome - 逐行导入结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowStatus {
    Inserted,
    Updated,
    Rejected,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowStatus::Inserted => write!(f, "INSERTED"),
            RowStatus::Updated => write!(f, "UPDATED"),
            RowStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_number: usize,       // 数据行号（表头为第 1 行，数据从第 2 行开始）
    pub item_id: Option<i64>,    // 可解析时的商品编号
    pub status: RowStatus,
    pub reasons: Vec<FieldViolation>, // 拒绝原因（成功时为空）
}

impl RowOutcome {
    pub fn accepted(row_number: usize, item_id: i64, status: RowStatus) -> Self {
        Self {
            row_number,
            item_id: Some(item_id),
            status,
            reasons: Vec::new(),
        }
    }

    pub fn rejected(row_number: usize, item_id: Option<i64>, reasons: Vec<FieldViolation>) -> Self {
        Self {
            row_number,
            item_id,
            status: RowStatus::Rejected,
            reasons,
        }
    }
}

// ==========================================
// ValidatedRow - 通过校验、待写入的行
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub item: GroceryItem,
    /// 源数据未提供的可选字段（覆盖更新时保留库内值）
    pub omitted: OmittedFields,
}

/// 源数据缺省的可选字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OmittedFields {
    pub quantity: bool,
    pub reorder_point: bool,
    pub last_sold: bool,
    pub date_added: bool,
}

impl OmittedFields {
    pub fn of(record: &RawItemRecord) -> Self {
        Self {
            quantity: record.quantity.is_none(),
            reorder_point: record.reorder_point.is_none(),
            last_sold: record.last_sold.is_none(),
            date_added: record.date_added.is_none(),
        }
    }
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    pub rejected: usize,
}

impl ImportSummary {
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let mut summary = Self {
            total_rows: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                RowStatus::Inserted => summary.inserted += 1,
                RowStatus::Updated => summary.updated += 1,
                RowStatus::Rejected => summary.rejected += 1,
            }
        }
        summary
    }

    /// 已落库行数
    pub fn committed(&self) -> usize {
        self.inserted + self.updated
    }
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,           // 批次 ID（UUID）
    pub file_name: Option<String>,  // 源文件名
    pub duplicate_policy: DuplicatePolicy,
    pub total_rows: i32,
    pub inserted_rows: i32,
    pub updated_rows: i32,
    pub rejected_rows: i32,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: i64,
}

// ==========================================
// RowRejection - 拒绝明细（落库）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowRejection {
    pub batch_id: String,
    pub row_number: usize,
    pub item_id: Option<i64>,
    pub field: String,
    pub reason: String,
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResult {
    pub batch: ImportBatch,
    pub summary: ImportSummary,
    pub outcomes: Vec<RowOutcome>,
    #[serde(skip)]
    pub elapsed_time: Duration,
}

impl ImportResult {
    /// 展开所有拒绝明细
    pub fn rejections(&self) -> Vec<RowRejection> {
        self.outcomes
            .iter()
            .filter(|o| o.status == RowStatus::Rejected)
            .flat_map(|o| {
                o.reasons.iter().map(move |r| RowRejection {
                    batch_id: self.batch.batch_id.clone(),
                    row_number: o.row_number,
                    item_id: o.item_id,
                    field: r.field.clone(),
                    reason: r.reason.clone(),
                })
            })
            .collect()
    }
}
