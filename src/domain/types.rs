// ==========================================
// 门店运营数据导入 - 基础类型
// ==========================================
// 职责: 单元格原始值 / 清洗后值 / 值类别
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CellValue - 单元格原始值
// ==========================================
// 来源: Excel / CSV 单元格，类型未知
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// 空白 / NaN / "-" 视为空值
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            CellValue::Text(s) => {
                let t = s.trim();
                t.is_empty() || t == "-" || t.eq_ignore_ascii_case("nan")
            }
            CellValue::Int(_) | CellValue::DateTime(_) => false,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::DateTime(dt) => {
                // 整天日期只输出日期部分
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

/// 一行数据: 表头 → 单元格值
pub type RawRow = HashMap<String, CellValue>;

// ==========================================
// ValueClass - 值类别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueClass {
    Integer,
    Decimal,
    Rate,
    Ranking,
    Text,
}

impl ValueClass {
    /// 本地库列类型
    pub fn sqlite_type(&self) -> &'static str {
        match self {
            ValueClass::Integer | ValueClass::Ranking => "INTEGER",
            ValueClass::Decimal | ValueClass::Rate => "REAL",
            ValueClass::Text => "TEXT",
        }
    }
}

// ==========================================
// CleanValue - 清洗后的可空值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CleanValue {
    Null,
    Int(i64),
    Real(f64),
    Text(String),
}

impl From<&CleanValue> for rusqlite::types::Value {
    fn from(value: &CleanValue) -> Self {
        match value {
            CleanValue::Null => rusqlite::types::Value::Null,
            CleanValue::Int(i) => rusqlite::types::Value::Integer(*i),
            CleanValue::Real(f) => rusqlite::types::Value::Real(*f),
            CleanValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_blank_markers() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("  ").is_blank());
        assert!(CellValue::text("-").is_blank());
        assert!(CellValue::text("NaN").is_blank());
        assert!(CellValue::Float(f64::NAN).is_blank());
        assert!(!CellValue::Int(0).is_blank());
        assert!(!CellValue::text("0").is_blank());
    }

    #[test]
    fn test_display_date_only() {
        let dt = NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2025-04-01");
        assert_eq!(CellValue::text("20250401").to_string(), "20250401");
    }
}
