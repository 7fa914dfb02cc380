// ==========================================
// 杂货库存管理系统 - 导入层
// ==========================================
// 职责: 外部文件批量导入商品
// 支持: CSV, Excel (.xlsx/.xls), 内存上传
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod item_importer_impl;
pub mod item_importer_trait;
pub mod row_validator;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImporterResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use item_importer_impl::ItemImporterImpl;
pub use row_validator::RowValidator as RowValidatorImpl;

// 重导出 Trait 接口
pub use item_importer_trait::{
    DataCleaner, FieldMapper, FileParser, ItemImporter, ParsedRow, ParsedSheet, RowDefaults,
    RowValidator, Upload,
};
