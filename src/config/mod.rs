// ==========================================
// 门店运营数据导入 - 配置层
// ==========================================
// 职责: 静态映射表与运行参数，启动时加载一次
// 存储: 内置默认值 + 可选 JSON 覆盖文件
// ==========================================

pub mod column_table;
pub mod error;
pub mod import_config;
pub mod upload_config;

// 重导出核心配置类型
pub use column_table::{classify, ColumnEntry, ColumnSpec, ColumnTable};
pub use error::{ConfigError, ConfigResult};
pub use import_config::{
    ImportConfig, PlatformFile, PlatformImportConfig, SalesFile, SalesImportConfig,
    SheetLayout, SheetSelector,
};
pub use upload_config::{UploadConfig, UploadFile, UploadMode};

/// 默认本地数据库路径（用户数据目录下）
pub fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("restaurant-ops-import").join("ops_data.db"))
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "ops_data.db".to_string())
}
