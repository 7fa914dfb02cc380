// ==========================================
// 杂货库存管理系统 - 视图模型
// ==========================================
// 职责: 各请求的输出结构（HTML 与 JSON 共用同一结构）
// ==========================================

use crate::domain::import::{ImportBatch, ImportResult, RowRejection};
use crate::domain::item::{FieldViolation, GroceryItem};
use crate::domain::report::ReportSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 可渲染视图
pub trait View: Serialize {
    /// 页面标题的翻译键
    fn title_key(&self) -> &'static str;
}

// ==========================================
// 检索结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchView {
    pub criterion: String,
    pub value: String,
    pub count: usize,
    pub items: Vec<GroceryItem>,
}

impl SearchView {
    pub fn new(criterion: impl Into<String>, value: impl Into<String>, items: Vec<GroceryItem>) -> Self {
        Self {
            criterion: criterion.into(),
            value: value.into(),
            count: items.len(),
            items,
        }
    }
}

impl View for SearchView {
    fn title_key(&self) -> &'static str {
        "search.title"
    }
}

// ==========================================
// 单条商品写入结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWriteView {
    pub action: WriteAction,
    pub id: i64,
    pub item: Option<GroceryItem>,
}

impl View for ItemWriteView {
    fn title_key(&self) -> &'static str {
        "item.write_title"
    }
}

/// 单条商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub item: GroceryItem,
}

impl View for ItemView {
    fn title_key(&self) -> &'static str {
        "item.title"
    }
}

// ==========================================
// 导入
// ==========================================
impl View for ImportResult {
    fn title_key(&self) -> &'static str {
        "import.title"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchListView {
    pub batches: Vec<ImportBatch>,
}

impl View for BatchListView {
    fn title_key(&self) -> &'static str {
        "import.batches_title"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionListView {
    pub batch_id: String,
    pub rejections: Vec<RowRejection>,
}

impl View for RejectionListView {
    fn title_key(&self) -> &'static str {
        "import.rejections_title"
    }
}

// ==========================================
// 报表
// ==========================================
impl View for ReportSnapshot {
    fn title_key(&self) -> &'static str {
        "report.title"
    }
}

// ==========================================
// 健康检查 / 诊断
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthView {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub schema_version: Option<i64>,
    pub schema_ok: bool,
    pub item_count: i64,
}

impl View for HealthView {
    fn title_key(&self) -> &'static str {
        "health.title"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsView {
    pub health: HealthView,
    pub database_path: String,
    pub config: serde_json::Value,
    pub recent_batches: Vec<ImportBatch>,
}

impl View for DiagnosticsView {
    fn title_key(&self) -> &'static str {
        "diagnostics.title"
    }
}

/// 生效配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigView {
    pub settings: BTreeMap<String, String>,
}

impl View for ConfigView {
    fn title_key(&self) -> &'static str {
        "config.title"
    }
}

// ==========================================
// 错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorView {
    pub error: String,
    pub message: String,
    pub field: Option<String>,
    pub reasons: Vec<FieldViolation>,
}

impl View for ErrorView {
    fn title_key(&self) -> &'static str {
        "error.title"
    }
}
