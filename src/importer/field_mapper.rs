// ==========================================
// 门店运营数据导入 - 平台数据字段映射器
// ==========================================
// 职责: RawRow → MetricRecord
// 规则: 门店名称精确匹配；日期原样保留；
//       列按映射表顺序清洗，同字段后出现者覆盖
// ==========================================

use crate::config::column_table::{DATE_COLUMN, STORE_NAME_COLUMN};
use crate::config::ColumnTable;
use crate::domain::import_report::SkipReason;
use crate::domain::metric::{MetricKey, MetricRecord};
use crate::domain::types::RawRow;
use crate::importer::data_cleaner::DataCleaner;
use std::collections::BTreeMap;

pub struct PlatformRowMapper<'a> {
    columns: &'a ColumnTable,
    store_mapping: &'a BTreeMap<String, i64>,
    platform_id: i64,
    cleaner: DataCleaner,
}

impl<'a> PlatformRowMapper<'a> {
    pub fn new(
        columns: &'a ColumnTable,
        store_mapping: &'a BTreeMap<String, i64>,
        platform_id: i64,
    ) -> Self {
        Self {
            columns,
            store_mapping,
            platform_id,
            cleaner: DataCleaner,
        }
    }

    /// 映射一行
    ///
    /// # 返回
    /// - Ok(MetricRecord): 可写入的记录
    /// - Err(SkipReason): 门店未匹配 / 日期缺失
    pub fn map_row(&self, row: &RawRow, row_number: usize) -> Result<MetricRecord, SkipReason> {
        let store_name = row
            .get(STORE_NAME_COLUMN)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let store_id = *self
            .store_mapping
            .get(&store_name)
            .ok_or_else(|| SkipReason::UnknownStore(store_name.clone()))?;

        let report_date = match row.get(DATE_COLUMN) {
            Some(cell) if !cell.is_blank() => cell.to_string(),
            _ => return Err(SkipReason::MissingKey(DATE_COLUMN.to_string())),
        };

        let mut fields = BTreeMap::new();
        for spec in self.columns.specs() {
            if let Some(cell) = row.get(&spec.label) {
                fields.insert(spec.field.clone(), self.cleaner.clean(cell, spec.class));
            }
        }

        Ok(MetricRecord {
            key: MetricKey {
                report_date,
                store_id,
                platform_id: self.platform_id,
            },
            fields,
            row_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnEntry;
    use crate::domain::types::{CellValue, CleanValue};
    use chrono::NaiveDate;

    fn stores() -> BTreeMap<String, i64> {
        [("宁桂杏山野烤肉（世贸店）".to_string(), 8)].into_iter().collect()
    }

    fn row(cells: &[(&str, CellValue)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_map_row_cleans_by_class() {
        let columns = ColumnTable::default();
        let stores = stores();
        let mapper = PlatformRowMapper::new(&columns, &stores, 1);

        let date = NaiveDate::from_ymd_opt(2025, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let record = mapper
            .map_row(
                &row(&[
                    ("日期", CellValue::DateTime(date)),
                    ("门店名称", CellValue::text("宁桂杏山野烤肉（世贸店）")),
                    ("曝光次数", CellValue::Float(1200.0)),
                    ("好评率", CellValue::text("98%")),
                    ("城市", CellValue::text("德阳")),
                    ("访问人数", CellValue::text("-")),
                ]),
                3,
            )
            .unwrap();

        assert_eq!(record.key.report_date, "2025-04-01");
        assert_eq!(record.key.store_id, 8);
        assert_eq!(record.key.platform_id, 1);
        assert_eq!(record.get("exposure_count"), Some(&CleanValue::Int(1200)));
        assert_eq!(record.get("positive_rate"), Some(&CleanValue::Real(0.98)));
        assert_eq!(record.get("city"), Some(&CleanValue::Text("德阳".into())));
        assert_eq!(record.get("visit_users"), Some(&CleanValue::Null));
        // 行中不存在的列不出现
        assert_eq!(record.get("exposure_users"), None);
        assert_eq!(record.row_number, 3);
    }

    #[test]
    fn test_unknown_store_and_missing_date() {
        let columns = ColumnTable::default();
        let stores = stores();
        let mapper = PlatformRowMapper::new(&columns, &stores, 2);

        let unknown = mapper.map_row(
            &row(&[
                ("日期", CellValue::text("2025-04-01")),
                ("门店名称", CellValue::text("不存在的店")),
            ]),
            1,
        );
        assert_eq!(unknown, Err(SkipReason::UnknownStore("不存在的店".into())));

        let no_date = mapper.map_row(
            &row(&[("门店名称", CellValue::text("宁桂杏山野烤肉（世贸店）"))]),
            2,
        );
        assert!(matches!(no_date, Err(SkipReason::MissingKey(_))));
    }

    #[test]
    fn test_later_label_wins_for_shared_field() {
        let columns = ColumnTable::from_entries(&[
            ColumnEntry {
                label: "美团星级".into(),
                field: "platform_star_rating".into(),
                class: None,
            },
            ColumnEntry {
                label: "点评星级".into(),
                field: "platform_star_rating".into(),
                class: None,
            },
        ])
        .unwrap();
        let stores = stores();
        let mapper = PlatformRowMapper::new(&columns, &stores, 1);

        let record = mapper
            .map_row(
                &row(&[
                    ("日期", CellValue::text("2025-04-01")),
                    ("门店名称", CellValue::text("宁桂杏山野烤肉（世贸店）")),
                    ("美团星级", CellValue::Float(4.5)),
                    ("点评星级", CellValue::Float(4.8)),
                ]),
                1,
            )
            .unwrap();
        assert_eq!(
            record.get("platform_star_rating"),
            Some(&CleanValue::Real(4.8))
        );
    }
}
