// ==========================================
// 门店运营数据导入 - 导入结果汇总
// ==========================================
// 每行一个 RowOutcome，按文件聚合为 FileImportSummary，
// 整次运行聚合为 RunSummary
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 行被跳过的原因
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// 门店名称不在映射表中
    UnknownStore(String),
    /// 缺少日期等主键值
    MissingKey(String),
    /// 无法得到菜品名称
    MissingProductName,
    /// 折前/折后金额均为 0（赠品/营销项）
    ZeroSales,
    /// 单行写入失败（已回滚该行）
    WriteFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownStore(name) => write!(f, "未匹配门店: {}", name),
            SkipReason::MissingKey(field) => write!(f, "主键缺失: {}", field),
            SkipReason::MissingProductName => write!(f, "菜品名称为空"),
            SkipReason::ZeroSales => write!(f, "销售额为 0"),
            SkipReason::WriteFailed(msg) => write!(f, "写入失败: {}", msg),
        }
    }
}

/// 单行处理结果
pub type RowOutcome = Result<(), SkipReason>;

// ==========================================
// FileImportSummary - 单文件导入汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileImportSummary {
    pub batch_id: String,
    pub file_name: String,
    pub total_rows: usize,
    pub inserted: usize,

    pub skipped_unknown_store: usize,
    pub skipped_missing_key: usize,
    pub skipped_zero_sales: usize,
    pub skipped_write_failed: usize,

    /// 未匹配门店（去重，按首次出现顺序）
    pub unmatched_stores: Vec<String>,
    /// 未匹配到产品 ID 且已写入的菜品（去重）
    pub uncategorized_products: Vec<String>,

    /// 销售额合计（仅销售导入）
    pub pre_discount_total: f64,
    /// 菜品收入合计（仅销售导入）
    pub revenue_total: f64,

    pub elapsed_ms: u64,
}

impl FileImportSummary {
    pub fn new(batch_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            file_name: file_name.into(),
            ..Default::default()
        }
    }

    /// 记录一行结果
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            Ok(()) => self.inserted += 1,
            Err(SkipReason::UnknownStore(name)) => {
                self.skipped_unknown_store += 1;
                if !self.unmatched_stores.iter().any(|s| s == name) {
                    self.unmatched_stores.push(name.clone());
                }
            }
            Err(SkipReason::MissingKey(_)) | Err(SkipReason::MissingProductName) => {
                self.skipped_missing_key += 1
            }
            Err(SkipReason::ZeroSales) => self.skipped_zero_sales += 1,
            Err(SkipReason::WriteFailed(_)) => self.skipped_write_failed += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_unknown_store
            + self.skipped_missing_key
            + self.skipped_zero_sales
            + self.skipped_write_failed
    }

    /// 导入数 + 跳过数 == 读取行数
    pub fn is_balanced(&self) -> bool {
        self.inserted + self.skipped() == self.total_rows
    }
}

// ==========================================
// RunSummary - 整次运行汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub files: Vec<FileImportSummary>,
    /// 不存在的文件（整文件跳过）
    pub missing_files: Vec<String>,
    /// 文件存在但无法读取/解析
    pub failed_files: Vec<(String, String)>,
}

impl RunSummary {
    pub fn total_inserted(&self) -> usize {
        self.files.iter().map(|f| f.inserted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped()).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|f| f.total_rows).sum()
    }

    pub fn unmatched_stores(&self) -> Vec<String> {
        let mut all: Vec<String> = Vec::new();
        for name in self.files.iter().flat_map(|f| f.unmatched_stores.iter()) {
            if !all.contains(name) {
                all.push(name.clone());
            }
        }
        all
    }
}
