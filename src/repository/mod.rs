// ==========================================
// 门店运营数据导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 值一律参数化；拼入 SQL 的字段名必须通过标识符校验
// ==========================================

pub mod error;
pub mod platform_metrics_repo;
pub mod sales_summary_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use platform_metrics_repo::{PlatformMetricsRepository, PlatformMetricsRepositoryImpl};
pub use sales_summary_repo::{SalesSummaryRepository, SalesSummaryRepositoryImpl};
