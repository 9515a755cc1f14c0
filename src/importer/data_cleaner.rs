// ==========================================
// 门店运营数据导入 - 数据清洗器实现
// ==========================================
// 职责: 单元格原始值 → 按值类别得到可空的类型化值
// 约束: 不报错；无法解析一律为 NULL
// ==========================================

use crate::domain::types::{CellValue, CleanValue, ValueClass};
use regex::Regex;
use std::sync::OnceLock;

fn ranking_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"第([0-9]+)名").ok())
        .as_ref()
}

/// 全角数字 ０-９ 折叠为半角
fn fold_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            _ => c,
        })
        .collect()
}

/// 截断取整；超出 i64 范围为 None
fn truncate_to_i64(f: f64) -> Option<i64> {
    let t = f.trunc();
    // i64::MAX as f64 向上取整为 2^63，须用严格小于
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

pub struct DataCleaner;

impl DataCleaner {
    /// 按值类别清洗
    ///
    /// 空白 / NaN / "-" 对所有类别都返回 Null
    pub fn clean(&self, value: &CellValue, class: ValueClass) -> CleanValue {
        if value.is_blank() {
            return CleanValue::Null;
        }
        match class {
            ValueClass::Integer => self.clean_integer(value),
            ValueClass::Decimal => self.clean_decimal(value),
            ValueClass::Rate => self.clean_rate(value),
            ValueClass::Ranking => self.clean_ranking(value),
            ValueClass::Text => CleanValue::Text(value.to_string()),
        }
    }

    fn clean_integer(&self, value: &CellValue) -> CleanValue {
        match value {
            CellValue::Int(i) => CleanValue::Int(*i),
            // Excel 数字单元格多为浮点，取整数部分
            CellValue::Float(f) => truncate_to_i64(*f)
                .map(CleanValue::Int)
                .unwrap_or(CleanValue::Null),
            CellValue::Text(s) => fold_digits(s.trim())
                .parse::<i64>()
                .map(CleanValue::Int)
                .unwrap_or(CleanValue::Null),
            _ => CleanValue::Null,
        }
    }

    fn clean_decimal(&self, value: &CellValue) -> CleanValue {
        parse_f64(value)
            .map(CleanValue::Real)
            .unwrap_or(CleanValue::Null)
    }

    fn clean_rate(&self, value: &CellValue) -> CleanValue {
        if let CellValue::Text(s) = value {
            if s.contains('%') {
                return s
                    .replace('%', "")
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| CleanValue::Real(f / 100.0))
                    .unwrap_or(CleanValue::Null);
            }
        }
        self.clean_decimal(value)
    }

    fn clean_ranking(&self, value: &CellValue) -> CleanValue {
        if let CellValue::Text(s) = value {
            let folded = fold_digits(s);
            let rank = ranking_pattern()
                .and_then(|re| re.captures(&folded))
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<i64>().ok());
            if let Some(rank) = rank {
                return CleanValue::Int(rank);
            }
        }
        self.clean_integer(value)
    }

    /// 数值列强转，无法解析时为 0
    pub fn coerce_number(&self, value: Option<&CellValue>) -> f64 {
        value.and_then(parse_f64).unwrap_or(0.0)
    }
}

fn parse_f64(value: &CellValue) -> Option<f64> {
    let parsed = match value {
        CellValue::Int(i) => Some(*i as f64),
        CellValue::Float(f) => Some(*f),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Empty | CellValue::DateTime(_) => None,
    };
    parsed.filter(|f| f.is_finite())
}
