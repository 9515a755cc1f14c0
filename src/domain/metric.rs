// ==========================================
// 门店运营数据导入 - 平台日指标
// ==========================================
// 对齐: platform_daily_metrics 表
// 主键: (report_date, store_id, platform_id)
// ==========================================

use crate::domain::types::CleanValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 自然主键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub report_date: String,
    pub store_id: i64,
    pub platform_id: i64,
}

/// 主键列名（upsert 时不参与覆盖）
pub const METRIC_KEY_COLUMNS: [&str; 3] = ["report_date", "store_id", "platform_id"];

// ==========================================
// MetricRecord - 一行平台指标
// ==========================================
// 字段按名称有序保存，缺失列不出现在 fields 中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub key: MetricKey,
    pub fields: BTreeMap<String, CleanValue>,
    pub row_number: usize,
}

impl MetricRecord {
    pub fn get(&self, field: &str) -> Option<&CleanValue> {
        self.fields.get(field)
    }
}
