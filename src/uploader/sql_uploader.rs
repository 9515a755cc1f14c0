// ==========================================
// 门店运营数据导入 - SQL 文件上传
// ==========================================
// 流程: 启用扩展 → 按固定顺序逐个文件执行 → 汇总
// 模式: statements（逐条执行）/ whole-file（整文件一次执行）
// 约束: 严格串行；单条语句或单个文件失败不中断
// ==========================================

use crate::config::{UploadConfig, UploadMode};
use crate::uploader::client::SqlExecutor;
use crate::uploader::error::{UploadError, UploadResult};
use crate::uploader::sql_splitter::split_sql_statements;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// 单个文件的上传结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileUploadReport {
    pub path: String,
    pub statements: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 前几条错误（已截断）
    pub error_previews: Vec<String>,
}

impl FileUploadReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// 整次上传汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadSummary {
    pub extensions_succeeded: usize,
    pub extensions_failed: usize,
    pub files: Vec<FileUploadReport>,
    pub missing_files: Vec<String>,
    /// 存在但无法读取的文件
    pub unreadable_files: Vec<(String, String)>,
}

impl UploadSummary {
    pub fn succeeded_files(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| f.is_success())
            .map(|f| f.path.as_str())
            .collect()
    }

    /// 失败文件（含不存在 / 无法读取的文件）
    pub fn failed_files(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| !f.is_success())
            .map(|f| f.path.as_str())
            .chain(self.missing_files.iter().map(|s| s.as_str()))
            .chain(self.unreadable_files.iter().map(|(p, _)| p.as_str()))
            .collect()
    }

    pub fn statements_succeeded(&self) -> usize {
        self.files.iter().map(|f| f.succeeded).sum()
    }

    pub fn statements_failed(&self) -> usize {
        self.files.iter().map(|f| f.failed).sum()
    }
}

// ==========================================
// SqlUploader
// ==========================================
pub struct SqlUploader<E>
where
    E: SqlExecutor,
{
    executor: E,
    config: Arc<UploadConfig>,
}

impl<E> SqlUploader<E>
where
    E: SqlExecutor,
{
    pub fn new(executor: E, config: Arc<UploadConfig>) -> Self {
        Self { executor, config }
    }

    /// 执行扩展启用语句，返回 (成功数, 失败数)
    pub async fn enable_extensions(&self) -> (usize, usize) {
        info!(count = self.config.extensions.len(), "启用数据库扩展");
        let mut succeeded = 0;
        let mut failed = 0;
        for ext in &self.config.extensions {
            match self.executor.execute(ext).await {
                Ok(_) => {
                    succeeded += 1;
                    info!(statement = %ext, "✓ 扩展已启用");
                }
                Err(e) => {
                    failed += 1;
                    warn!(statement = %ext, error = %e.preview(self.config.error_preview_chars()), "✗ 扩展启用失败");
                }
            }
        }
        (succeeded, failed)
    }

    /// 上传单个 SQL 文件
    ///
    /// # 返回
    /// - Ok(FileUploadReport): 已执行（可能含失败语句）
    /// - Err: 文件不存在或无法读取
    #[instrument(skip(self, path), fields(file = %path.display()))]
    pub async fn upload_file(&self, path: &Path) -> UploadResult<FileUploadReport> {
        let path_str = path.display().to_string();
        if !path.exists() {
            return Err(UploadError::FileNotFound(path_str));
        }
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| UploadError::FileReadError {
                    path: path_str.clone(),
                    message: e.to_string(),
                })?;

        let report = match self.config.mode {
            UploadMode::Statements => self.run_statements(path_str, &content).await,
            UploadMode::WholeFile => self.run_whole_file(path_str, &content).await,
        };
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "文件上传完成"
        );
        Ok(report)
    }

    async fn run_statements(&self, path: String, content: &str) -> FileUploadReport {
        let statements = split_sql_statements(content);
        let total = statements.len();
        info!(total, "开始逐条执行");

        let mut report = FileUploadReport {
            path,
            statements: total,
            ..Default::default()
        };
        let delay = Duration::from_millis(self.config.statement_delay_ms);

        for (idx, stmt) in statements.iter().enumerate() {
            match self.executor.execute(stmt).await {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    if report.failed <= self.config.max_error_previews {
                        let preview = e.preview(self.config.statement_error_preview_chars);
                        warn!(statement = idx + 1, error = %preview, "语句执行失败");
                        report.error_previews.push(preview);
                    }
                }
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        report
    }

    async fn run_whole_file(&self, path: String, content: &str) -> FileUploadReport {
        info!(chars = content.chars().count(), "整文件执行");
        let mut report = FileUploadReport {
            path,
            statements: 1,
            ..Default::default()
        };
        match self.executor.execute(content).await {
            Ok(_) => report.succeeded = 1,
            Err(e) => {
                report.failed = 1;
                let preview = e.preview(self.config.file_error_preview_chars);
                error!(error = %preview, "文件执行失败");
                report.error_previews.push(preview);
            }
        }
        report
    }

    /// 按给定顺序上传文件（整文件模式下文件之间按 file_delay_ms 间隔）
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> UploadSummary {
        let mut summary = UploadSummary::default();
        let delay = match self.config.mode {
            UploadMode::WholeFile => Duration::from_millis(self.config.file_delay_ms),
            UploadMode::Statements => Duration::ZERO,
        };

        for (idx, path) in paths.iter().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self.upload_file(path).await {
                Ok(report) => summary.files.push(report),
                Err(UploadError::FileNotFound(p)) => {
                    warn!(file = %p, "文件不存在，跳过");
                    summary.missing_files.push(p);
                }
                Err(e) => {
                    error!(file = %path.display(), error = %e, "读取文件失败");
                    summary
                        .unreadable_files
                        .push((path.display().to_string(), e.to_string()));
                }
            }
        }
        summary
    }

    /// 完整上传: 先启用扩展，再按配置顺序上传全部文件
    pub async fn upload_all(&self, with_extensions: bool) -> UploadSummary {
        let (ok, failed) = if with_extensions {
            self.enable_extensions().await
        } else {
            (0, 0)
        };
        let mut summary = self.upload_paths(&self.config.ordered_paths()).await;
        summary.extensions_succeeded = ok;
        summary.extensions_failed = failed;

        info!(
            succeeded = summary.succeeded_files().len(),
            failed = summary.failed_files().len(),
            statements_succeeded = summary.statements_succeeded(),
            statements_failed = summary.statements_failed(),
            "上传完成汇总"
        );
        summary
    }
}
