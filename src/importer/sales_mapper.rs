// ==========================================
// 门店运营数据导入 - 菜品销售映射器
// ==========================================
// 职责: 菜品销售统计表一行 → SalesRecord（产品 ID 由导入器解析）
// 规则: 名称去空白 + 全角括号转半角；
//       销售额与菜品收入同为 0 的行（赠品/营销项）跳过
// ==========================================

use crate::domain::import_report::SkipReason;
use crate::domain::sales::{discount_rate, SalesRecord};
use crate::domain::types::{CellValue, RawRow};
use crate::importer::data_cleaner::DataCleaner;

pub const PRODUCT_NAME_COLUMN: &str = "菜品名称";
pub const QUANTITY_COLUMN: &str = "销售数量";
pub const PRE_DISCOUNT_COLUMN: &str = "销售额";
pub const REVENUE_COLUMN: &str = "菜品收入";
pub const DISCOUNT_COLUMN: &str = "菜品优惠";

/// 汇总行标记
const TOTAL_ROW_MARKERS: [&str; 2] = ["合计", "总计"];

/// 标准化菜品名称，空名称返回 None
pub fn normalize_product_name(raw: &CellValue) -> Option<String> {
    if raw.is_blank() {
        return None;
    }
    let name = raw.to_string().trim().replace('（', "(").replace('）', ")");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// 半角括号 → 全角括号（产品表匹配用）
pub fn full_width_variant(name: &str) -> String {
    name.replace('(', "（").replace(')', "）")
}

/// 是否为菜品明细行（排除空名称与合计/总计行）
pub fn is_product_row(row: &RawRow) -> bool {
    match row.get(PRODUCT_NAME_COLUMN) {
        Some(cell) if !cell.is_blank() => {
            let name = cell.to_string();
            !TOTAL_ROW_MARKERS.iter().any(|m| name.contains(m))
        }
        _ => false,
    }
}

pub struct SalesRowMapper<'a> {
    period: &'a str,
    store_id: i64,
    cleaner: DataCleaner,
}

impl<'a> SalesRowMapper<'a> {
    pub fn new(period: &'a str, store_id: i64) -> Self {
        Self {
            period,
            store_id,
            cleaner: DataCleaner,
        }
    }

    /// 数值列（无法解析视为 0）
    pub fn amount(&self, row: &RawRow, column: &str) -> f64 {
        self.cleaner.coerce_number(row.get(column))
    }

    /// 映射一行；product_id 留空
    pub fn map_row(&self, row: &RawRow, row_number: usize) -> Result<SalesRecord, SkipReason> {
        let product_name = row
            .get(PRODUCT_NAME_COLUMN)
            .and_then(normalize_product_name)
            .ok_or(SkipReason::MissingProductName)?;

        let pre_discount_amount = self.amount(row, PRE_DISCOUNT_COLUMN);
        let revenue = self.amount(row, REVENUE_COLUMN);
        if pre_discount_amount == 0.0 && revenue == 0.0 {
            return Err(SkipReason::ZeroSales);
        }

        let discount = self.amount(row, DISCOUNT_COLUMN);

        Ok(SalesRecord {
            period: self.period.to_string(),
            store_id: self.store_id,
            product_name,
            product_id: None,
            quantity: self.amount(row, QUANTITY_COLUMN),
            pre_discount_amount,
            revenue,
            discount,
            discount_rate: discount_rate(discount, pre_discount_amount),
            row_number,
        })
    }
}
