// ==========================================
// 杂货库存管理系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// ==========================================

use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::item_importer_trait::{FileParser, ParsedRow, ParsedSheet};
use calamine::{open_workbook_auto, Data, Range, Reader, Xls, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// 小写扩展名
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImporterResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// 收集一行；完全空白的行返回 None
fn collect_row(
    headers: &[String],
    values: impl Iterator<Item = String>,
    row_number: usize,
) -> Option<ParsedRow> {
    let mut fields = HashMap::new();
    for (col_idx, value) in values.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            fields.insert(header.clone(), value.trim().to_string());
        }
    }

    if fields.values().all(|v| v.is_empty()) {
        return None;
    }
    Some(ParsedRow { row_number, fields })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    fn parse_reader<R: Read>(&self, reader: R) -> ImporterResult<ParsedSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        // 读取表头（去掉 UTF-8 BOM）
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            // 表头为第 1 行；空行由 csv 跳过，行号以记录起始行为准
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            if let Some(row) = collect_row(&headers, record.iter().map(str::to_string), row_number) {
                rows.push(row);
            }
        }

        Ok(ParsedSheet { headers, rows })
    }
}

impl FileParser for CsvParser {
    fn parse_file(&self, file_path: &Path) -> ImporterResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut bytes = Vec::new();
        File::open(file_path)?.read_to_end(&mut bytes)?;
        self.parse_bytes(&bytes)
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        std::str::from_utf8(bytes).map_err(|e| ImportError::EncodingError(e.to_string()))?;
        self.parse_reader(bytes)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser {
    legacy_xls: bool,
}

impl ExcelParser {
    pub fn xlsx() -> Self {
        Self { legacy_xls: false }
    }

    pub fn xls() -> Self {
        Self { legacy_xls: true }
    }

    /// 读取第一个工作表
    fn first_sheet<R: Reader<RS>, RS: std::io::Read + std::io::Seek>(
        workbook: &mut R,
    ) -> ImporterResult<Range<Data>>
    where
        R::Error: std::fmt::Display,
    {
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))
    }

    fn range_to_sheet(range: &Range<Data>) -> ParsedSheet {
        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return ParsedSheet::default(),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in rows_iter.enumerate() {
            let values = data_row.iter().map(|cell| cell.to_string());
            if let Some(row) = collect_row(&headers, values, idx + 2) {
                rows.push(row);
            }
        }

        ParsedSheet { headers, rows }
    }
}

impl FileParser for ExcelParser {
    fn parse_file(&self, file_path: &Path) -> ImporterResult<ParsedSheet> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let range = Self::first_sheet::<_, BufReader<File>>(&mut workbook)?;
        Ok(Self::range_to_sheet(&range))
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let cursor = Cursor::new(bytes.to_vec());
        let range = if self.legacy_xls {
            let mut workbook: Xls<_> =
                Xls::new(cursor).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            Self::first_sheet::<_, Cursor<Vec<u8>>>(&mut workbook)?
        } else {
            let mut workbook: Xlsx<_> =
                Xlsx::new(cursor).map_err(|e| ImportError::ExcelParseError(e.to_string()))?;
            Self::first_sheet::<_, Cursor<Vec<u8>>>(&mut workbook)?
        };
        Ok(Self::range_to_sheet(&range))
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    fn parser_for(ext: &str) -> ImporterResult<Box<dyn FileParser>> {
        match ext {
            "csv" => Ok(Box::new(CsvParser)),
            "xlsx" => Ok(Box::new(ExcelParser::xlsx())),
            "xls" => Ok(Box::new(ExcelParser::xls())),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_file(&self, file_path: &Path) -> ImporterResult<ParsedSheet> {
        ensure_exists(file_path)?;
        Self::parser_for(&extension_of(file_path))?.parse_file(file_path)
    }

    fn parse_bytes(&self, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        // 无文件名时按 CSV 处理
        CsvParser.parse_bytes(bytes)
    }

    fn parse_named_bytes(&self, file_name: &str, bytes: &[u8]) -> ImporterResult<ParsedSheet> {
        let ext = extension_of(Path::new(file_name));
        Self::parser_for(&ext)?.parse_bytes(bytes)
    }
}

/// 是否为支持的导入格式
pub fn is_supported_extension(ext: &str) -> bool {
    matches!(ext, "csv" | "xlsx" | "xls")
}
