// ==========================================
// 门店运营数据导入 - 平台数据导入器
// ==========================================
// 职责: 整合导入流程，从平台导出文件到 platform_daily_metrics
// 流程: 解析 → 映射/清洗 → 批量 upsert（逐行 savepoint）→ 汇总
// 事务: 每个文件提交一次
// ==========================================

use crate::config::column_table::STORE_NAME_COLUMN;
use crate::config::{ColumnTable, ImportConfig, PlatformFile};
use crate::domain::import_report::{FileImportSummary, RowOutcome, RunSummary, SkipReason};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::PlatformRowMapper;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::repository::PlatformMetricsRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PlatformImporter - 平台数据导入器
// ==========================================
pub struct PlatformImporter<R>
where
    R: PlatformMetricsRepository,
{
    repo: R,
    config: Arc<ImportConfig>,
    columns: ColumnTable,
    file_parser: Box<dyn FileParser>,
}

impl<R> PlatformImporter<R>
where
    R: PlatformMetricsRepository,
{
    /// # 参数
    /// - repo: 平台指标仓储
    /// - config: 导入配置（列映射表在此构建一次）
    pub fn new(repo: R, config: Arc<ImportConfig>) -> ImportResult<Self> {
        let columns = config.column_table()?;
        Ok(Self {
            repo,
            config,
            columns,
            file_parser: Box::new(UniversalFileParser),
        })
    }

    /// 导入单个平台导出文件
    ///
    /// # 返回
    /// - Ok(FileImportSummary): 导入数 + 各类跳过数 == 读取行数
    /// - Err: 文件不存在 / 无法解析 / 未知平台 / 事务失败
    #[instrument(skip(self, file_path), fields(batch_id, file = %file_path.display()))]
    pub async fn import_file(
        &self,
        file_path: &Path,
        platform_code: &str,
    ) -> ImportResult<FileImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let platform_id = self
            .config
            .platform_id(platform_code)
            .ok_or_else(|| ImportError::UnknownPlatform(platform_code.to_string()))?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        info!(platform = platform_code, platform_id, "开始导入平台数据");

        // === 步骤 1: 解析文件 ===
        let rows = self
            .file_parser
            .parse_rows(file_path, &self.config.platform.layout)?;
        if let Some(first) = rows.first() {
            if !first.contains_key(STORE_NAME_COLUMN) {
                return Err(ImportError::MissingColumn(STORE_NAME_COLUMN.to_string()));
            }
        }

        let mut summary = FileImportSummary::new(&batch_id, &file_name);
        summary.total_rows = rows.len();
        info!(total_rows = summary.total_rows, "文件解析完成");

        // === 步骤 2: 映射/清洗 ===
        let mapper = PlatformRowMapper::new(
            &self.columns,
            &self.config.platform.store_mapping,
            platform_id,
        );
        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match mapper.map_row(row, idx + 1) {
                Ok(record) => records.push(record),
                Err(reason) => {
                    debug!(row_number = idx + 1, reason = %reason, "跳过行");
                    summary.record(&Err(reason));
                }
            }
        }

        // === 步骤 3: 批量 upsert ===
        let outcomes = self.repo.upsert_batch(&records).await?;
        for (record, result) in records.iter().zip(outcomes) {
            let outcome: RowOutcome = result.map_err(|e| {
                warn!(row_number = record.row_number, error = %e, "行写入失败，已回滚该行");
                SkipReason::WriteFailed(e.to_string())
            });
            summary.record(&outcome);
        }

        summary.elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped(),
            elapsed_ms = summary.elapsed_ms,
            "平台数据导入完成"
        );
        if !summary.unmatched_stores.is_empty() {
            warn!(stores = ?summary.unmatched_stores, "未匹配门店");
        }

        Ok(summary)
    }

    /// 按文件清单顺序导入
    ///
    /// 不存在的文件记入 missing_files，解析失败的文件记入 failed_files，
    /// 两者都不影响后续文件
    pub async fn import_plan(&self, base_dir: &Path, files: &[PlatformFile]) -> RunSummary {
        info!(count = files.len(), "开始导入平台数据文件");
        let mut run = RunSummary::default();

        for entry in files {
            let path = base_dir.join(&entry.file);
            if !path.exists() {
                warn!(file = %entry.file, "文件不存在，跳过");
                run.missing_files.push(entry.file.clone());
                continue;
            }

            match self.import_file(&path, &entry.platform).await {
                Ok(summary) => run.files.push(summary),
                Err(e) => {
                    error!(file = %entry.file, error = %e, "文件导入失败");
                    run.failed_files.push((entry.file.clone(), e.to_string()));
                }
            }
        }

        info!(
            inserted = run.total_inserted(),
            skipped = run.total_skipped(),
            missing = run.missing_files.len(),
            failed = run.failed_files.len(),
            "平台数据导入结束"
        );
        run
    }
}
