// ==========================================
// 门店运营数据导入 - SQL 上传配置
// ==========================================
// 职责: 托管数据库 HTTP 查询接口参数 + 有序 SQL 文件清单
// 约束: 访问令牌只从环境变量读取，不写入配置文件
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_ACCESS_TOKEN: &str = "SUPABASE_ACCESS_TOKEN";
pub const ENV_PROJECT_REF: &str = "SUPABASE_PROJECT_REF";
pub const ENV_API_URL: &str = "SUPABASE_API_URL";

/// 上传方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UploadMode {
    /// 拆分为单条语句逐条执行
    Statements,
    /// 整个文件一次提交
    WholeFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    /// 相对 base_path 的路径
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UploadFile {
    fn new(path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            description: Some(description.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub api_url: String,
    pub project_ref: String,
    #[serde(skip)]
    pub access_token: Option<String>,

    pub base_path: PathBuf,
    pub mode: UploadMode,

    /// 逐条模式下语句间隔
    pub statement_delay_ms: u64,
    /// 整文件模式下文件间隔
    pub file_delay_ms: u64,
    pub statement_timeout_secs: u64,
    pub file_timeout_secs: u64,

    /// 每个文件最多展示的语句错误数
    pub max_error_previews: usize,
    pub statement_error_preview_chars: usize,
    pub file_error_preview_chars: usize,

    /// 上传前启用的扩展
    pub extensions: Vec<String>,
    /// 执行顺序: schema → functions → views → data
    pub files: Vec<UploadFile>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.supabase.com".to_string(),
            project_ref: String::new(),
            access_token: None,
            base_path: PathBuf::from("db"),
            mode: UploadMode::Statements,
            statement_delay_ms: 100,
            file_delay_ms: 500,
            statement_timeout_secs: 120,
            file_timeout_secs: 300,
            max_error_previews: 3,
            statement_error_preview_chars: 200,
            file_error_preview_chars: 500,
            extensions: vec![
                "CREATE EXTENSION IF NOT EXISTS pgcrypto;".to_string(),
                r#"CREATE EXTENSION IF NOT EXISTS "uuid-ossp";"#.to_string(),
                "CREATE EXTENSION IF NOT EXISTS pg_trgm;".to_string(),
                "CREATE EXTENSION IF NOT EXISTS btree_gin;".to_string(),
            ],
            files: default_upload_files(),
        }
    }
}

fn default_upload_files() -> Vec<UploadFile> {
    vec![
        // Schema
        UploadFile::new("schema/IMS_schema_core_mvp.sql", "核心表结构"),
        UploadFile::new("schema/IMS_schema_extension_order_system.sql", "订单扩展表"),
        UploadFile::new("schema/IMS_schema_platform_data.sql", "平台数据表"),
        UploadFile::new("schema/IMS_schema_product_sku.sql", "SKU规格表"),
        UploadFile::new("schema/IMS_schema_store_purchase_price.sql", "采购价格表"),
        // Functions
        UploadFile::new("functions/IMS_functions.sql", "基础函数"),
        UploadFile::new("functions/IMS_functions_cost_encryption.sql", "成本加密"),
        UploadFile::new("functions/IMS_functions_bom_explosion.sql", "BOM分解"),
        UploadFile::new("functions/IMS_procedures_data_validation.sql", "数据验证"),
        UploadFile::new("functions/IMS_triggers_automatic_calculation.sql", "自动计算"),
        UploadFile::new("functions/IMS_triggers_price_calculation.sql", "价格计算"),
        // Views
        UploadFile::new("views/IMS_views_financial_analysis.sql", "财务分析视图"),
        UploadFile::new("views/IMS_views_operations_kpi.sql", "运营KPI视图"),
        UploadFile::new("views/IMS_views_price_comparison.sql", "价格对比视图"),
        // Data
        UploadFile::new("data/IMS_data_init_mvp.sql", "基础初始化"),
        UploadFile::new("data/IMS_data_organization_stores.sql", "组织与门店"),
        UploadFile::new("data/IMS_data_raw_materials.sql", "原材料"),
        UploadFile::new("data/IMS_data_products_recipes.sql", "产品与配方"),
        UploadFile::new("data/IMS_data_init_sku.sql", "SKU初始化"),
        UploadFile::new("data/IMS_data_cost_card_import.sql", "成本卡"),
        UploadFile::new("data/IMS_data_sop_import.sql", "SOP数据"),
        UploadFile::new("data/IMS_data_new_mushroom_products.sql", "新增菌菇产品"),
    ]
}

impl UploadConfig {
    /// 从 JSON 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 环境变量覆盖（令牌 / 项目 / 接口地址）
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            if !token.trim().is_empty() {
                self.access_token = Some(token.trim().to_string());
            }
        }
        if let Ok(project_ref) = std::env::var(ENV_PROJECT_REF) {
            if !project_ref.trim().is_empty() {
                self.project_ref = project_ref.trim().to_string();
            }
        }
        if let Ok(api_url) = std::env::var(ENV_API_URL) {
            if !api_url.trim().is_empty() {
                self.api_url = api_url.trim().to_string();
            }
        }
        self
    }

    /// 查询接口地址
    pub fn query_url(&self) -> ConfigResult<String> {
        if self.project_ref.is_empty() {
            return Err(ConfigError::Missing(ENV_PROJECT_REF.to_string()));
        }
        Ok(format!(
            "{}/v1/projects/{}/database/query",
            self.api_url.trim_end_matches('/'),
            self.project_ref
        ))
    }

    pub fn token(&self) -> ConfigResult<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ConfigError::Missing(ENV_ACCESS_TOKEN.to_string()))
    }

    /// 当前模式下单次请求超时
    pub fn request_timeout(&self) -> Duration {
        match self.mode {
            UploadMode::Statements => Duration::from_secs(self.statement_timeout_secs),
            UploadMode::WholeFile => Duration::from_secs(self.file_timeout_secs),
        }
    }

    pub fn error_preview_chars(&self) -> usize {
        match self.mode {
            UploadMode::Statements => self.statement_error_preview_chars,
            UploadMode::WholeFile => self.file_error_preview_chars,
        }
    }

    /// 按配置顺序展开为完整路径
    pub fn ordered_paths(&self) -> Vec<PathBuf> {
        self.files
            .iter()
            .map(|f| self.base_path.join(&f.path))
            .collect()
    }
}
