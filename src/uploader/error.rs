// ==========================================
// 门店运营数据导入 - 上传模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 单条语句 / 单个文件的失败不中断整次上传
// ==========================================

use crate::config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("读取文件失败: {path}: {message}")]
    FileReadError { path: String, message: String },

    #[error("请求失败: {0}")]
    Transport(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UploadError::Timeout(err.to_string())
        } else {
            UploadError::Transport(err.to_string())
        }
    }
}

impl UploadError {
    /// 截断后的错误预览
    pub fn preview(&self, max_chars: usize) -> String {
        self.to_string().chars().take(max_chars).collect()
    }
}

pub type UploadResult<T> = Result<T, UploadError>;
