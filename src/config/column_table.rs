// ==========================================
// 门店运营数据导入 - 平台数据列映射表
// ==========================================
// 职责: Excel 列名 → 库字段名 + 值类别
// 约束: 字段名会拼入 SQL，加载时必须校验
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::metric::METRIC_KEY_COLUMNS;
use crate::domain::types::ValueClass;
use serde::{Deserialize, Serialize};

/// 日期列（作为主键单独处理）
pub const DATE_COLUMN: &str = "日期";

/// 门店名称列
pub const STORE_NAME_COLUMN: &str = "门店名称";

/// 排名字段
const RANKING_FIELDS: [&str; 2] = ["ranking_popularity", "ranking_sales"];

/// 金额类字段
const AMOUNT_FIELDS: [&str; 9] = [
    "gmv_before_discount",
    "gmv_after_discount",
    "user_paid_amount",
    "platform_subsidy",
    "consume_amount",
    "refund_amount",
    "new_customer_gmv",
    "old_customer_gmv",
    "platform_star_rating",
];

/// 文本字段
const TEXT_FIELDS: [&str; 3] = ["province", "city", "business_area"];

/// 默认列映射（Excel 列名, 库字段名）
const DEFAULT_COLUMNS: &[(&str, &str)] = &[
    ("日期", "report_date"),
    ("省份", "province"),
    ("城市", "city"),
    ("归属商圈", "business_area"),
    ("曝光次数", "exposure_count"),
    ("曝光人数", "exposure_users"),
    ("曝光人数-搜索", "exposure_users_search"),
    ("曝光人数-美食频道", "exposure_users_food_channel"),
    ("曝光人数-首页信息流", "exposure_users_feed"),
    ("访问次数", "visit_count"),
    ("访问人数", "visit_users"),
    ("访问人数-搜索", "visit_users_search"),
    ("访问人数-美食频道", "visit_users_food_channel"),
    ("访问人数-首页信息流", "visit_users_feed"),
    ("曝光-访问转化率", "exposure_visit_rate"),
    ("曝光-访问转化率-搜索", "exposure_visit_rate_search"),
    ("曝光-访问转化率-美食频道", "exposure_visit_rate_food_channel"),
    ("曝光-访问转化率-首页信息流", "exposure_visit_rate_feed"),
    ("购买人数", "purchase_users"),
    ("购买人数-搜索", "purchase_users_search"),
    ("购买人数-美食频道", "purchase_users_food_channel"),
    ("购买人数-首页信息流", "purchase_users_feed"),
    ("访问-购买转化率", "visit_purchase_rate"),
    ("访问-购买转化率-搜索", "visit_purchase_rate_search"),
    ("访问-购买转化率-美食频道", "visit_purchase_rate_food_channel"),
    ("访问-购买转化率-首页信息流", "visit_purchase_rate_feed"),
    ("互动人数", "interaction_users"),
    ("新增收藏人数", "new_favorite_users"),
    ("累计收藏人数", "total_favorite_users"),
    ("打卡人数", "checkin_users"),
    ("查看优惠人数", "view_coupon_users"),
    ("查看菜品人数", "view_dish_users"),
    ("查看评价人数", "view_review_users"),
    ("查看地址/电话人数", "view_contact_users"),
    ("成交金额(优惠前)", "gmv_before_discount"),
    ("成交金额(优惠前)-套餐", "gmv_before_discount_package"),
    ("成交金额(优惠前)-代金券", "gmv_before_discount_voucher"),
    ("成交金额(优惠前)-买单", "gmv_before_discount_bill"),
    ("成交订单数", "order_count"),
    ("成交订单数-套餐", "order_count_package"),
    ("成交订单数-代金券", "order_count_voucher"),
    ("成交订单数-买单", "order_count_bill"),
    ("成交券数-套餐", "coupon_count_package"),
    ("成交券数-代金券", "coupon_count_voucher"),
    ("成交人数", "transaction_users"),
    ("成交人数-套餐", "transaction_users_package"),
    ("成交人数-代金券", "transaction_users_voucher"),
    ("成交人数-买单", "transaction_users_bill"),
    ("成交金额(优惠后)", "gmv_after_discount"),
    ("成交金额(优惠后)-套餐", "gmv_after_discount_package"),
    ("成交金额(优惠后)-代金券", "gmv_after_discount_voucher"),
    ("成交金额(优惠后)-买单", "gmv_after_discount_bill"),
    ("用户实付金额", "user_paid_amount"),
    ("用户实付金额-套餐", "user_paid_amount_package"),
    ("用户实付金额-代金券", "user_paid_amount_voucher"),
    ("用户实付金额-买单", "user_paid_amount_bill"),
    ("平台补贴金额", "platform_subsidy"),
    ("平台补贴金额-套餐", "platform_subsidy_package"),
    ("平台补贴金额-代金券", "platform_subsidy_voucher"),
    ("平台补贴金额-买单", "platform_subsidy_bill"),
    ("消费金额", "consume_amount"),
    ("核销金额-套餐", "consume_amount_package"),
    ("核销金额-代金券", "consume_amount_voucher"),
    ("消费笔数", "consume_count"),
    ("核销券数-套餐", "consume_coupon_package"),
    ("核销券数-代金券", "consume_coupon_voucher"),
    ("消费人数", "consume_users"),
    ("核销人数-套餐", "consume_users_package"),
    ("核销人数-代金券", "consume_users_voucher"),
    ("退款金额", "refund_amount"),
    ("退款金额-套餐", "refund_amount_package"),
    ("退款金额-代金券", "refund_amount_voucher"),
    ("退款金额-买单", "refund_amount_bill"),
    ("退款券数-套餐", "refund_coupon_package"),
    ("退款券数-代金券", "refund_coupon_voucher"),
    ("退款订单数", "refund_order_count"),
    ("退款订单数-买单", "refund_order_count_bill"),
    ("新客购买人数", "new_customer_users"),
    ("老客购买人数", "old_customer_users"),
    ("新客成交金额(优惠后)", "new_customer_gmv"),
    ("老客成交金额(优惠后)", "old_customer_gmv"),
    ("扫码人数", "scan_users"),
    ("扫码打卡人数", "scan_checkin_users"),
    ("扫码收藏人数", "scan_favorite_users"),
    ("扫码评价人数", "scan_review_users"),
    ("全部评价数", "total_review_count"),
    ("全部好评数", "total_positive_count"),
    ("好评率", "positive_rate"),
    ("全部中差评数", "total_negative_count"),
    ("新评价数", "new_review_count"),
    ("新好评数", "new_positive_count"),
    ("新中差评数", "new_negative_count"),
    ("新中差评回复率", "negative_reply_rate"),
    ("美团星级", "platform_star_rating"),
    ("美团人气榜榜单排名", "ranking_popularity"),
    ("点评星级", "platform_star_rating"),
    ("点评热门榜排名", "ranking_popularity"),
    ("点评销量榜排名", "ranking_sales"),
];

/// 按列名/字段名推断值类别
///
/// 优先级（先命中先生效）:
/// 1. Rate    - 字段名含 `rate` 或列名含 `率`
/// 2. Ranking - 排名字段或列名含 `榜`
/// 3. Decimal - 金额字段或列名含 `金额` / `星级`
/// 4. Text    - 省份/城市/商圈
/// 5. Integer - 其余
pub fn classify(label: &str, field: &str) -> ValueClass {
    if field.contains("rate") || label.contains('率') {
        ValueClass::Rate
    } else if RANKING_FIELDS.contains(&field) || label.contains('榜') {
        ValueClass::Ranking
    } else if AMOUNT_FIELDS.contains(&field) || label.contains("金额") || label.contains("星级")
    {
        ValueClass::Decimal
    } else if TEXT_FIELDS.contains(&field) {
        ValueClass::Text
    } else {
        ValueClass::Integer
    }
}

/// 配置文件中的一条列映射
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub label: String,
    pub field: String,
    /// 显式指定类别时跳过推断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<ValueClass>,
}

/// 解析后的列规格
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub label: String,
    pub field: String,
    pub class: ValueClass,
}

// ==========================================
// ColumnTable - 不可变列映射表
// ==========================================
#[derive(Debug, Clone)]
pub struct ColumnTable {
    specs: Vec<ColumnSpec>,
}

impl ColumnTable {
    /// 由列映射条目构建（日期列不进入字段表）
    pub fn from_entries(entries: &[ColumnEntry]) -> ConfigResult<Self> {
        let mut specs = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.label == DATE_COLUMN || entry.field == "report_date" {
                continue;
            }
            if !is_valid_identifier(&entry.field) {
                return Err(ConfigError::InvalidFieldName {
                    label: entry.label.clone(),
                    field: entry.field.clone(),
                });
            }
            if METRIC_KEY_COLUMNS.contains(&entry.field.as_str()) {
                return Err(ConfigError::ReservedFieldName(entry.field.clone()));
            }
            specs.push(ColumnSpec {
                label: entry.label.clone(),
                field: entry.field.clone(),
                class: entry
                    .class
                    .unwrap_or_else(|| classify(&entry.label, &entry.field)),
            });
        }
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ColumnSpec] {
        &self.specs
    }

    /// 去重后的字段列表（建表用，按首次出现顺序）
    pub fn fields(&self) -> Vec<(&str, ValueClass)> {
        let mut out: Vec<(&str, ValueClass)> = Vec::new();
        for spec in &self.specs {
            if !out.iter().any(|(f, _)| *f == spec.field) {
                out.push((spec.field.as_str(), spec.class));
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for ColumnTable {
    fn default() -> Self {
        let specs = default_column_entries()
            .into_iter()
            .filter(|e| e.label != DATE_COLUMN)
            .map(|e| ColumnSpec {
                class: classify(&e.label, &e.field),
                label: e.label,
                field: e.field,
            })
            .collect();
        Self { specs }
    }
}

pub fn default_column_entries() -> Vec<ColumnEntry> {
    DEFAULT_COLUMNS
        .iter()
        .map(|(label, field)| ColumnEntry {
            label: label.to_string(),
            field: field.to_string(),
            class: None,
        })
        .collect()
}

/// 字段名: [a-z_][a-z0-9_]*
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
