// ==========================================
// 门店运营数据导入 - 菜品销售汇总
// ==========================================
// 对齐: sales_summary 表
// 主键: (summary_period, store_id, product_name)
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub period: String,
    pub store_id: i64,
    /// 标准化后的菜品名称（半角括号）
    pub product_name: String,
    /// 未匹配到产品时为 None，仍然落库
    pub product_id: Option<i64>,

    pub quantity: f64,
    /// 销售额（折前）
    pub pre_discount_amount: f64,
    /// 菜品收入（折后）
    pub revenue: f64,
    pub discount: f64,
    /// 折扣率（百分数，两位小数）
    pub discount_rate: f64,

    pub row_number: usize,
}

impl SalesRecord {
    pub fn is_uncategorized(&self) -> bool {
        self.product_id.is_none()
    }
}

/// 折扣率 = 优惠 / 折前金额 * 100，折前金额 <= 0 时为 0
pub fn discount_rate(discount: f64, pre_discount_amount: f64) -> f64 {
    if pre_discount_amount > 0.0 {
        round2(discount / pre_discount_amount * 100.0)
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
