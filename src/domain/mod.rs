// ==========================================
// 门店运营数据导入 - 领域模型层
// ==========================================
// 职责: 定义记录、值类型、导入结果
// 红线: 不含数据访问逻辑
// ==========================================

pub mod import_report;
pub mod metric;
pub mod sales;
pub mod types;

pub use import_report::{FileImportSummary, RowOutcome, RunSummary, SkipReason};
pub use metric::{MetricKey, MetricRecord, METRIC_KEY_COLUMNS};
pub use sales::{discount_rate, SalesRecord};
pub use types::{CellValue, CleanValue, RawRow, ValueClass};
