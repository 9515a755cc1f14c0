// ==========================================
// 门店运营数据导入 - 远程 SQL 执行客户端
// ==========================================
// 接口: POST {api}/v1/projects/{ref}/database/query
// 请求体: {"query": "<sql>"}，Bearer 令牌认证
// ==========================================

use crate::config::UploadConfig;
use crate::uploader::error::{UploadError, UploadResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// 远程 SQL 执行接口
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// 执行一段 SQL，成功时返回响应体
    async fn execute(&self, sql: &str) -> UploadResult<String>;
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

// ==========================================
// ManagementApiClient - 托管数据库管理接口
// ==========================================
pub struct ManagementApiClient {
    client: Client,
    query_url: String,
    access_token: String,
}

impl ManagementApiClient {
    /// # 参数
    /// - config: 上传配置（令牌来自环境变量）
    ///
    /// # 返回
    /// - Err: 缺少项目 ID 或访问令牌 / HTTP 客户端构建失败
    pub fn from_config(config: &UploadConfig) -> UploadResult<Self> {
        let query_url = config.query_url()?;
        let access_token = config.token()?.to_string();
        Self::new(query_url, access_token, config.request_timeout())
    }

    pub fn new(query_url: String, access_token: String, timeout: Duration) -> UploadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Transport(format!("HTTP 客户端构建失败: {}", e)))?;
        Ok(Self {
            client,
            query_url,
            access_token,
        })
    }
}

#[async_trait]
impl SqlExecutor for ManagementApiClient {
    async fn execute(&self, sql: &str) -> UploadResult<String> {
        debug!(chars = sql.chars().count(), "执行 SQL");
        let response = self
            .client
            .post(&self.query_url)
            .bearer_auth(&self.access_token)
            .json(&QueryBody { query: sql })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(UploadError::HttpStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn test_from_config_builds_client() {
        let config = UploadConfig {
            project_ref: "abcd".into(),
            access_token: Some("token".into()),
            ..Default::default()
        };
        let client = ManagementApiClient::from_config(&config).unwrap();
        assert_eq!(
            client.query_url,
            "https://api.supabase.com/v1/projects/abcd/database/query"
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let config = UploadConfig {
            project_ref: "abcd".into(),
            access_token: None,
            ..Default::default()
        };
        let result = ManagementApiClient::from_config(&config);
        assert!(matches!(
            result,
            Err(UploadError::Config(ConfigError::Missing(_)))
        ));
    }
}
