// ==========================================
// 门店运营数据导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级问题不走这里（见 SkipReason），
//       这里只收整文件 / 整批级别的错误
// ==========================================

use crate::config::ConfigError;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作表不存在: {0}")]
    SheetNotFound(String),

    #[error("表头行不存在 (第 {0} 行)")]
    HeaderRowMissing(usize),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 配置错误 =====
    #[error("未知平台: {0}")]
    UnknownPlatform(String),

    #[error("未知门店: {0}")]
    UnknownStore(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    // ===== 数据库错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
