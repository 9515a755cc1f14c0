// ==========================================
// 门店运营数据导入 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + 托管数据库查询接口
// 系统定位: 一次性数据迁移工具（串行、尽力而为）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与值类型
pub mod domain;

// 配置层 - 映射表与运行参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 数据仓储层 - upsert 与查询
pub mod repository;

// 导入层 - 表格文件 → 本地库
pub mod importer;

// 上传层 - SQL 文件 → 远程库
pub mod uploader;

// 日志系统
pub mod logging;

// 命令行参数
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{ImportConfig, UploadConfig};
pub use domain::{
    CellValue, CleanValue, FileImportSummary, MetricRecord, RunSummary, SalesRecord, ValueClass,
};
pub use importer::{PlatformImporter, SalesImporter};
pub use uploader::{SqlUploader, UploadSummary};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "门店运营数据导入";
