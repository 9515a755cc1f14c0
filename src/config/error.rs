// ==========================================
// 门店运营数据导入 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("非法字段名 (列 {label}): {field}")]
    InvalidFieldName { label: String, field: String },

    #[error("字段名与主键列冲突: {0}")]
    ReservedFieldName(String),

    #[error("缺少配置项: {0}")]
    Missing(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
