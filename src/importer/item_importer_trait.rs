// ==========================================
// 杂货库存管理系统 - 商品导入 Trait
// ==========================================
// 职责: 定义导入主接口与各阶段接口（不包含实现）
// ==========================================

use crate::domain::import::ImportResult;
use crate::domain::item::{FieldViolation, GroceryItem, RawItemRecord};
use crate::importer::error::ImporterResult;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

/// 内存中的上传文件
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
        }
    }
}

/// 解析后的单行（列名 → 值）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub row_number: usize, // 文件行号（表头为第 1 行）
    pub fields: HashMap<String, String>,
}

/// 解析后的表格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

/// 行校验默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowDefaults {
    pub default_reorder_point: i32,
    pub today: NaiveDate,
}

// ==========================================
// ItemImporter Trait
// ==========================================
// 用途: 商品导入主接口
// 实现者: ItemImporterImpl
#[async_trait]
pub trait ItemImporter: Send + Sync {
    /// 从文件导入（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(ImportResult): 逐行结果 + 汇总 + 批次
    /// - Err: 文件级错误（文件不存在、格式不支持、过大、缺列等）
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 字段映射（表头别名）
    /// 3. 基础清洗（TRIM / NULL 标准化 / 金额符号）
    /// 4. 行校验
    /// 5. 落库（单事务，行级保存点）
    /// 6. 批次与拒绝明细记录
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImporterResult<ImportResult>;

    /// 从内存上传导入
    async fn import_upload(&self, upload: Upload) -> ImporterResult<ImportResult>;

    /// 批量导入多个文件（并发执行，互不影响）
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportResult, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件
    fn parse_file(&self, file_path: &Path) -> ImporterResult<ParsedSheet>;

    /// 解析内存数据
    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet>;

    /// 解析带文件名的内存数据（按扩展名选择格式的解析器可覆盖）
    fn parse_named_bytes(&self, _file_name: &str, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        self.parse_bytes(bytes)
    }
}

// ==========================================
// FieldMapper Trait
// ==========================================
pub trait FieldMapper: Send + Sync {
    /// 将原始行映射为 RawItemRecord（未知列忽略）
    fn map_to_raw_item(&self, row: &ParsedRow) -> RawItemRecord;

    /// 表头缺少的必需列（空 = 齐全）
    fn missing_required_columns(&self, headers: &[String]) -> Vec<String>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
pub trait DataCleaner: Send + Sync {
    /// TRIM（可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 空白 → None
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 去掉货币符号、千分位与空白
    fn clean_money(&self, value: &str) -> String;

    /// 整数清洗（去千分位，Excel 的 "12.0" → "12"）
    fn clean_integer(&self, value: &str) -> String;

    /// 日期解析（YYYY-MM-DD / YYYYMMDD / MM/DD/YYYY）
    fn parse_date(&self, value: &str) -> Result<NaiveDate, String>;

    /// 清洗整条记录
    fn clean_record(&self, record: &mut RawItemRecord);
}

// ==========================================
// RowValidator Trait
// ==========================================
pub trait RowValidator: Send + Sync {
    /// 校验并构建商品
    ///
    /// # 返回
    /// - Ok(GroceryItem): 校验通过
    /// - Err(Vec<FieldViolation>): 逐字段违规原因
    fn validate(
        &self,
        record: &RawItemRecord,
        defaults: &RowDefaults,
    ) -> Result<GroceryItem, Vec<FieldViolation>>;

    /// 可解析时的商品编号（用于拒绝明细）
    fn item_id(&self, record: &RawItemRecord) -> Option<i64>;
}
