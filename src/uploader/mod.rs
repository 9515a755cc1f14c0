// ==========================================
// 门店运营数据导入 - SQL 上传层
// ==========================================
// 职责: 拆分 SQL 文件并推送到托管数据库的查询接口
// ==========================================

pub mod client;
pub mod error;
pub mod sql_splitter;
pub mod sql_uploader;

pub use client::{ManagementApiClient, SqlExecutor};
pub use error::{UploadError, UploadResult};
pub use sql_splitter::split_sql_statements;
pub use sql_uploader::{FileUploadReport, SqlUploader, UploadSummary};
