// ==========================================
// 门店运营数据导入 - POS 菜品销售导入器
// ==========================================
// 职责: 单店菜品销售统计表 → sales_summary
// 流程: 解析 → 过滤合计行 → 映射/产品匹配 → 批量 upsert → 汇总
// 事务: 每个门店文件提交一次
// ==========================================

use crate::config::{ImportConfig, SalesFile};
use crate::domain::import_report::{FileImportSummary, RowOutcome, RunSummary, SkipReason};
use crate::domain::sales::round2;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use crate::importer::sales_mapper::{
    full_width_variant, is_product_row, SalesRowMapper, PRE_DISCOUNT_COLUMN, REVENUE_COLUMN,
};
use crate::repository::SalesSummaryRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SalesImporter - 菜品销售导入器
// ==========================================
pub struct SalesImporter<R>
where
    R: SalesSummaryRepository,
{
    repo: R,
    config: Arc<ImportConfig>,
    file_parser: Box<dyn FileParser>,
}

impl<R> SalesImporter<R>
where
    R: SalesSummaryRepository,
{
    pub fn new(repo: R, config: Arc<ImportConfig>) -> Self {
        Self {
            repo,
            config,
            file_parser: Box::new(UniversalFileParser),
        }
    }

    /// 导入单个门店的菜品销售统计表
    ///
    /// # 参数
    /// - store_name: 门店名称（须在销售门店映射中）
    /// - period: 汇总周期标签，如 "2025-01至2025-11"
    #[instrument(skip(self, file_path), fields(batch_id, file = %file_path.display()))]
    pub async fn import_file(
        &self,
        file_path: &Path,
        store_name: &str,
        period: &str,
    ) -> ImportResult<FileImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let store_id = *self
            .config
            .sales
            .store_mapping
            .get(store_name)
            .ok_or_else(|| ImportError::UnknownStore(store_name.to_string()))?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        info!(store = store_name, store_id, period, "开始导入菜品销售");

        // === 步骤 1: 解析文件，去掉空名称与合计/总计行 ===
        let rows: Vec<_> = self
            .file_parser
            .parse_rows(file_path, &self.config.sales.layout)?
            .into_iter()
            .filter(is_product_row)
            .collect();

        let mapper = SalesRowMapper::new(period, store_id);
        let mut summary = FileImportSummary::new(&batch_id, &file_name);
        summary.total_rows = rows.len();
        summary.pre_discount_total = round2(
            rows.iter()
                .map(|row| mapper.amount(row, PRE_DISCOUNT_COLUMN))
                .sum(),
        );
        summary.revenue_total = round2(
            rows.iter()
                .map(|row| mapper.amount(row, REVENUE_COLUMN))
                .sum(),
        );
        info!(total_rows = summary.total_rows, "读取菜品数");

        // === 步骤 2: 映射 + 产品匹配 ===
        let mut records = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let mut record = match mapper.map_row(row, idx + 1) {
                Ok(record) => record,
                Err(reason) => {
                    debug!(row_number = idx + 1, reason = %reason, "跳过行");
                    summary.record(&Err(reason));
                    continue;
                }
            };

            let alt_name = full_width_variant(&record.product_name);
            match self
                .repo
                .find_product_id(&record.product_name, &alt_name)
                .await
            {
                Ok(product_id) => record.product_id = product_id,
                Err(e) => {
                    warn!(product = %record.product_name, error = %e, "产品查询失败，跳过该行");
                    summary.record(&Err(SkipReason::WriteFailed(e.to_string())));
                    continue;
                }
            }
            records.push(record);
        }

        // === 步骤 3: 批量 upsert ===
        let outcomes = self.repo.upsert_batch(&records).await?;
        for (record, result) in records.iter().zip(outcomes) {
            let outcome: RowOutcome = result.map_err(|e| {
                warn!(product = %record.product_name, error = %e, "行写入失败，已回滚该行");
                SkipReason::WriteFailed(e.to_string())
            });
            // 只列出已写入的未归类菜品
            if outcome.is_ok()
                && record.is_uncategorized()
                && !summary.uncategorized_products.contains(&record.product_name)
            {
                summary.uncategorized_products.push(record.product_name.clone());
            }
            summary.record(&outcome);
        }

        summary.elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            inserted = summary.inserted,
            skipped = summary.skipped(),
            uncategorized = summary.uncategorized_products.len(),
            pre_discount_total = summary.pre_discount_total,
            revenue_total = summary.revenue_total,
            elapsed_ms = summary.elapsed_ms,
            "菜品销售导入完成"
        );

        Ok(summary)
    }

    /// 按门店文件清单顺序导入
    pub async fn import_plan(&self, base_dir: &Path, files: &[SalesFile]) -> RunSummary {
        info!(count = files.len(), "开始导入菜品销售文件");
        let mut run = RunSummary::default();

        for entry in files {
            let path = base_dir.join(&entry.file);
            if !path.exists() {
                warn!(file = %entry.file, "文件不存在，跳过");
                run.missing_files.push(entry.file.clone());
                continue;
            }

            match self.import_file(&path, &entry.store, &entry.period).await {
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
            "菜品销售导入结束"
        );
        run
    }
}
