// ==========================================
// 杂货库存管理系统 - 商品导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 映射 → 清洗 → 校验 → 落库 → 批次记录
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::import::{
    ImportBatch, ImportResult, ImportSummary, OmittedFields, RowOutcome, ValidatedRow,
};
use crate::importer::data_cleaner::DataCleaner as DataCleanerImpl;
use crate::importer::error::{ImportError, ImporterResult};
use crate::importer::field_mapper::FieldMapper as FieldMapperImpl;
use crate::importer::file_parser::{extension_of, is_supported_extension, UniversalFileParser};
use crate::importer::item_importer_trait::{
    DataCleaner, FieldMapper, FileParser, ItemImporter, ParsedSheet, RowDefaults, RowValidator,
    Upload,
};
use crate::importer::row_validator::RowValidator as RowValidatorImpl;
use crate::repository::ItemImportRepository;
use chrono::{Local, Utc};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ItemImporterImpl - 商品导入器实现
// ==========================================
pub struct ItemImporterImpl<R, C>
where
    R: ItemImportRepository,
    C: ImportConfigReader,
{
    // 数据访问层
    import_repo: R,

    // 配置读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    data_cleaner: Box<dyn DataCleaner>,
    row_validator: Box<dyn RowValidator>,
}

impl<R, C> ItemImporterImpl<R, C>
where
    R: ItemImportRepository,
    C: ImportConfigReader,
{
    /// 创建新的 ItemImporter 实例
    ///
    /// # 参数
    /// - import_repo: 导入数据仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - data_cleaner: 数据清洗器
    /// - row_validator: 行校验器
    pub fn new(
        import_repo: R,
        config: C,
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        data_cleaner: Box<dyn DataCleaner>,
        row_validator: Box<dyn RowValidator>,
    ) -> Self {
        Self {
            import_repo,
            config,
            file_parser,
            field_mapper,
            data_cleaner,
            row_validator,
        }
    }

    /// 使用默认组件创建
    pub fn with_default_stages(import_repo: R, config: C) -> Self {
        Self::new(
            import_repo,
            config,
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DataCleanerImpl),
            Box::new(RowValidatorImpl),
        )
    }

    /// 上传大小检查
    async fn check_size(&self, size: u64) -> ImporterResult<()> {
        let limit = self.config.get_max_upload_bytes().await?;
        if size > limit {
            warn!(size = size, limit = limit, "上传文件超过大小上限");
            return Err(ImportError::FileTooLarge { size, limit });
        }
        Ok(())
    }

    /// 已解析表格 → 导入结果（步骤 2 ~ 6）
    async fn import_sheet(
        &self,
        sheet: ParsedSheet,
        file_name: Option<String>,
        batch_id: String,
        start_time: Instant,
    ) -> ImporterResult<ImportResult> {
        // === 步骤 2: 表头检查 ===
        debug!("步骤 2: 表头检查");
        let missing = self.field_mapper.missing_required_columns(&sheet.headers);
        if !missing.is_empty() {
            error!(missing = ?missing, "缺少必需列");
            return Err(ImportError::MissingColumns(missing));
        }

        let policy = self.config.get_duplicate_policy().await?;
        let defaults = RowDefaults {
            default_reorder_point: self.config.get_default_reorder_point().await?,
            today: Local::now().date_naive(),
        };

        // === 步骤 3: 映射 + 清洗 + 校验 ===
        debug!("步骤 3: 字段映射 / 数据清洗 / 行校验");
        let total_rows = sheet.rows.len();
        let mut valid_rows = Vec::with_capacity(total_rows);
        let mut outcomes: Vec<RowOutcome> = Vec::new();
        for row in &sheet.rows {
            let mut record = self.field_mapper.map_to_raw_item(row);
            self.data_cleaner.clean_record(&mut record);

            match self.row_validator.validate(&record, &defaults) {
                Ok(item) => valid_rows.push(ValidatedRow {
                    row_number: row.row_number,
                    item,
                    omitted: OmittedFields::of(&record),
                }),
                Err(reasons) => {
                    debug!(row_number = row.row_number, reasons = reasons.len(), "行校验未通过");
                    outcomes.push(RowOutcome::rejected(
                        row.row_number,
                        self.row_validator.item_id(&record),
                        reasons,
                    ));
                }
            }
        }
        info!(
            total = total_rows,
            valid = valid_rows.len(),
            rejected = outcomes.len(),
            "行校验完成"
        );

        // === 步骤 4: 落库 ===
        debug!(policy = %policy, "步骤 4: 落库");
        let written = self.import_repo.apply_rows(valid_rows, policy).await?;
        outcomes.extend(written);
        outcomes.sort_by_key(|o| o.row_number);

        // === 步骤 5: 汇总 ===
        let summary = ImportSummary::from_outcomes(&outcomes);
        let elapsed_time = start_time.elapsed();
        let batch = ImportBatch {
            batch_id,
            file_name,
            duplicate_policy: policy,
            total_rows: summary.total_rows as i32,
            inserted_rows: summary.inserted as i32,
            updated_rows: summary.updated as i32,
            rejected_rows: summary.rejected as i32,
            imported_at: Utc::now(),
            elapsed_ms: elapsed_time.as_millis() as i64,
        };
        let result = ImportResult {
            batch,
            summary,
            outcomes,
            elapsed_time,
        };

        // === 步骤 6: 批次记录 ===
        debug!("步骤 6: 批次记录");
        self.import_repo
            .insert_batch(&result.batch, &result.rejections())
            .await?;

        info!(
            batch_id = %result.batch.batch_id,
            inserted = result.summary.inserted,
            updated = result.summary.updated,
            rejected = result.summary.rejected,
            elapsed_ms = result.batch.elapsed_ms,
            "导入完成"
        );
        Ok(result)
    }
}

#[async_trait::async_trait]
impl<R, C> ItemImporter for ItemImporterImpl<R, C>
where
    R: ItemImportRepository + Send + Sync,
    C: ImportConfigReader + Send + Sync,
{
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path = file_path.as_ref();
        info!(batch_id = %batch_id, file_path = %path.display(), "开始导入商品数据");

        // === 步骤 1: 文件检查与解析 ===
        debug!("步骤 1: 文件检查与解析");
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        let ext = extension_of(path);
        if !is_supported_extension(&ext) {
            return Err(ImportError::UnsupportedFormat(ext));
        }
        self.check_size(std::fs::metadata(path)?.len()).await?;

        let sheet = self.file_parser.parse_file(path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        info!(total_rows = sheet.rows.len(), "文件解析完成");

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        self.import_sheet(sheet, file_name, batch_id, start_time).await
    }

    #[instrument(skip(self, upload), fields(batch_id))]
    async fn import_upload(&self, upload: Upload) -> ImporterResult<ImportResult> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        // === 步骤 1: 上传检查与解析 ===
        let file_name = match upload.file_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ImportError::NoFile),
        };
        info!(batch_id = %batch_id, file_name = %file_name, size = upload.bytes.len(), "开始导入上传文件");

        let ext = extension_of(Path::new(&file_name));
        if !is_supported_extension(&ext) {
            return Err(ImportError::UnsupportedFormat(ext));
        }
        self.check_size(upload.bytes.len() as u64).await?;

        let sheet = self
            .file_parser
            .parse_named_bytes(&file_name, &upload.bytes)
            .map_err(|e| {
                error!(error = %e, "上传文件解析失败");
                e
            })?;
        info!(total_rows = sheet.rows.len(), "文件解析完成");

        self.import_sheet(sheet, Some(file_name), batch_id, start_time)
            .await
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<ImportResult, String>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        // 为每个文件创建导入任务
        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                info!(file = %path_str, "开始导入文件");
                match self.import_file(path).await {
                    Ok(result) => {
                        info!(
                            file = %path_str,
                            inserted = result.summary.inserted,
                            updated = result.summary.updated,
                            "文件导入成功"
                        );
                        Ok(result)
                    }
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        // 并发执行所有导入任务
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}
