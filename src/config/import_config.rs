// ==========================================
// 门店运营数据导入 - 导入配置
// ==========================================
// 职责: 门店映射 / 平台 ID / 列映射 / 表格布局 / 默认文件清单
// 约束: 进程启动时加载一次，之后只读，显式传入各导入器
// ==========================================

use crate::config::column_table::{default_column_entries, ColumnEntry, ColumnTable};
use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ==========================================
// 表格布局
// ==========================================

/// 工作表选择: 序号或名称
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet: SheetSelector,
    /// 表头所在行（从 0 开始）
    pub header_row: usize,
    /// 表头之后需要丢弃的行数（子标题行）
    #[serde(default)]
    pub skip_rows_after_header: usize,
    /// 按位置覆盖列名（表头不规范时使用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_names: Option<Vec<String>>,
}

impl SheetLayout {
    /// 首个工作表、首行表头
    pub fn simple() -> Self {
        Self {
            sheet: SheetSelector::Index(0),
            header_row: 0,
            skip_rows_after_header: 0,
            column_names: None,
        }
    }
}

// ==========================================
// 平台数据导入配置
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformFile {
    pub file: String,
    pub platform: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformImportConfig {
    /// Excel 门店名称 → store_id
    pub store_mapping: BTreeMap<String, i64>,
    /// 平台代码 → platform_id
    pub platform_ids: BTreeMap<String, i64>,
    pub columns: Vec<ColumnEntry>,
    pub layout: SheetLayout,
    pub files: Vec<PlatformFile>,
}

impl Default for PlatformImportConfig {
    fn default() -> Self {
        let store_mapping = [
            ("宁桂杏山野烤肉（1958店）", 7),
            ("宁桂杏山野烤肉（世贸店）", 8),
            ("宁桂杏山野烤肉（上马YOUNGPARK店）", 3),
            ("宁桂杏山野烤肉（上马Young Park）", 3),
            ("宁桂杏山野烤肉（江油首店）", 4),
            ("野百灵·贵州酸汤火锅（1958店）", 2),
            ("野百灵·贵州酸汤火锅（德阳同森店）", 1),
            ("野百灵贵州酸汤火锅（1958店）", 2),
            ("野百灵贵州酸汤火锅（德阳店）", 1),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let platform_ids = [("meituan", 1), ("dianping", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let files = [
            ("美团4-6月.xlsx", "meituan"),
            ("美团6-9月.xlsx", "meituan"),
            ("美团9-11月.xlsx", "meituan"),
            ("点评4-6月.xlsx", "dianping"),
            ("点评6-9月.xlsx", "dianping"),
            ("点评9-11月.xlsx", "dianping"),
        ]
        .into_iter()
        .map(|(file, platform)| PlatformFile {
            file: file.to_string(),
            platform: platform.to_string(),
        })
        .collect();

        Self {
            store_mapping,
            platform_ids,
            columns: default_column_entries(),
            layout: SheetLayout {
                sheet: SheetSelector::Name("表1".to_string()),
                header_row: 1,
                skip_rows_after_header: 0,
                column_names: None,
            },
            files,
        }
    }
}

// ==========================================
// POS 销售导入配置
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFile {
    pub file: String,
    pub store: String,
    pub period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesImportConfig {
    /// 门店名称 → store_id
    pub store_mapping: BTreeMap<String, i64>,
    pub layout: SheetLayout,
    pub files: Vec<SalesFile>,
}

/// 菜品销售统计表的位置列名
pub const SALES_COLUMNS: [&str; 17] = [
    "菜品名称",
    "销售数量",
    "销售数量占比",
    "销售额",
    "销售额占比",
    "菜品收入",
    "菜品收入占比",
    "菜品优惠",
    "菜品优惠占比",
    "销售额构成_菜品",
    "销售额构成_做法",
    "销售额构成_加料",
    "销售额构成_餐盒",
    "菜品收入构成_菜品",
    "菜品收入构成_做法",
    "菜品收入构成_加料",
    "菜品收入构成_餐盒",
];

impl Default for SalesImportConfig {
    fn default() -> Self {
        let store_mapping = [
            ("宁桂杏1958店", 7),
            ("宁桂杏世贸店", 8),
            ("宁桂杏上马店", 3),
            ("宁桂杏江油店", 4),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let files = [
            (
                "宁桂杏1958店1.1-11.22日菜品销售统计.xlsx",
                "宁桂杏1958店",
                "2025-01至2025-11",
            ),
            (
                "宁桂杏世贸店3.8-11.22日菜品销售统计.xlsx",
                "宁桂杏世贸店",
                "2025-03至2025-11",
            ),
            (
                "宁桂杏上马店7-11.22菜品销售统计.xlsx",
                "宁桂杏上马店",
                "2025-07至2025-11",
            ),
            (
                "宁桂杏江油店9.28-11.22菜品销售统计.xlsx",
                "宁桂杏江油店",
                "2025-09至2025-11",
            ),
        ]
        .into_iter()
        .map(|(file, store, period)| SalesFile {
            file: file.to_string(),
            store: store.to_string(),
            period: period.to_string(),
        })
        .collect();

        Self {
            store_mapping,
            layout: SheetLayout {
                sheet: SheetSelector::Index(0),
                header_row: 2,
                skip_rows_after_header: 1,
                column_names: Some(SALES_COLUMNS.iter().map(|s| s.to_string()).collect()),
            },
            files,
        }
    }
}

// ==========================================
// ImportConfig - 导入配置总入口
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub platform: PlatformImportConfig,
    pub sales: SalesImportConfig,
}

impl ImportConfig {
    /// 从 JSON 文件加载，缺省段落使用内置默认值
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: ImportConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 有配置文件则加载，否则使用默认值
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> ConfigResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.column_table().map(|_| ())
    }

    /// 构建平台数据列映射表
    pub fn column_table(&self) -> ConfigResult<ColumnTable> {
        ColumnTable::from_entries(&self.platform.columns)
    }

    pub fn platform_id(&self, code: &str) -> Option<i64> {
        self.platform.platform_ids.get(code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.platform_id("meituan"), Some(1));
        assert_eq!(config.platform_id("dianping"), Some(2));
        assert_eq!(config.platform_id("eleme"), None);
        assert_eq!(
            config.platform.store_mapping.get("宁桂杏山野烤肉（世贸店）"),
            Some(&8)
        );
        assert_eq!(config.sales.store_mapping.get("宁桂杏江油店"), Some(&4));
        assert_eq!(config.platform.files.len(), 6);
        assert_eq!(config.sales.files.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"platform": {{"store_mapping": {{"测试店": 99}}}}}}"#
        )
        .unwrap();

        let config = ImportConfig::load(file.path()).unwrap();
        assert_eq!(config.platform.store_mapping.len(), 1);
        assert_eq!(config.platform.store_mapping.get("测试店"), Some(&99));
        // 未覆盖的段落保持默认
        assert_eq!(config.platform_id("meituan"), Some(1));
        assert_eq!(config.sales.files.len(), 4);
    }

    #[test]
    fn test_load_rejects_bad_field() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"platform": {{"columns": [{{"label": "曝光次数", "field": "Bad-Name"}}]}}}}"#
        )
        .unwrap();

        assert!(matches!(
            ImportConfig::load(file.path()),
            Err(ConfigError::InvalidFieldName { .. })
        ));
    }

    #[test]
    fn test_sheet_selector_json() {
        let by_name: SheetSelector = serde_json::from_str(r#""表1""#).unwrap();
        assert_eq!(by_name, SheetSelector::Name("表1".into()));
        let by_index: SheetSelector = serde_json::from_str("0").unwrap();
        assert_eq!(by_index, SheetSelector::Index(0));
    }
}
