// ==========================================
// 门店运营数据导入 - 导入层
// ==========================================
// 职责: 平台导出文件 / POS 销售统计表 → 本地库
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod platform_importer;
pub mod sales_importer;
pub mod sales_mapper;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use field_mapper::PlatformRowMapper;
pub use file_parser::{CsvParser, ExcelParser, FileParser, UniversalFileParser};
pub use platform_importer::PlatformImporter;
pub use sales_importer::SalesImporter;
pub use sales_mapper::{full_width_variant, normalize_product_name, SalesRowMapper};
