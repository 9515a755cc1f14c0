// ==========================================
// 门店运营数据导入 - 平台日指标 Repository
// ==========================================
// 职责: platform_daily_metrics 的 upsert 与查询
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::config::column_table::is_valid_identifier;
use crate::db::open_sqlite_connection;
use crate::domain::metric::{MetricKey, MetricRecord, METRIC_KEY_COLUMNS};
use crate::domain::types::CleanValue;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// PlatformMetricsRepository Trait
// ==========================================
#[async_trait]
pub trait PlatformMetricsRepository: Send + Sync {
    /// 批量 upsert（一个事务，逐行 savepoint）
    ///
    /// # 返回
    /// - Ok(Vec): 与 records 一一对应的单行结果，失败行已单独回滚
    /// - Err: 事务本身失败（整批未提交）
    async fn upsert_batch(
        &self,
        records: &[MetricRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<()>>>;

    /// 按主键读取指标字段（不含主键列）
    async fn find(&self, key: &MetricKey) -> RepositoryResult<Option<BTreeMap<String, CleanValue>>>;

    async fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// PlatformMetricsRepositoryImpl
// ==========================================
pub struct PlatformMetricsRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl PlatformMetricsRepositoryImpl {
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 与其他 Repository 共用连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 构造 upsert 语句与参数
    ///
    /// 冲突时覆盖本行出现的全部非主键字段（后写覆盖，包括 NULL）
    pub(crate) fn build_upsert(record: &MetricRecord) -> RepositoryResult<(String, Vec<Value>)> {
        let mut columns: Vec<&str> = METRIC_KEY_COLUMNS.to_vec();
        let mut values: Vec<Value> = vec![
            Value::Text(record.key.report_date.clone()),
            Value::Integer(record.key.store_id),
            Value::Integer(record.key.platform_id),
        ];

        for (field, value) in &record.fields {
            if !is_valid_identifier(field) || METRIC_KEY_COLUMNS.contains(&field.as_str()) {
                return Err(RepositoryError::FieldValueError {
                    field: field.clone(),
                    message: "非法字段名".to_string(),
                });
            }
            columns.push(field.as_str());
            values.push(Value::from(value));
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let updates: Vec<String> = columns
            .iter()
            .filter(|c| !METRIC_KEY_COLUMNS.contains(c))
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        let conflict_action = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };

        let sql = format!(
            "INSERT INTO platform_daily_metrics ({}) VALUES ({}) \
             ON CONFLICT (report_date, store_id, platform_id) {}",
            columns.join(", "),
            placeholders.join(", "),
            conflict_action
        );
        Ok((sql, values))
    }

    fn upsert_one(conn: &Connection, record: &MetricRecord) -> RepositoryResult<()> {
        let (sql, values) = Self::build_upsert(record)?;
        conn.execute(&sql, params_from_iter(values.iter()))?;
        Ok(())
    }
}

pub(crate) fn value_ref_to_clean(value: ValueRef<'_>) -> CleanValue {
    match value {
        ValueRef::Null => CleanValue::Null,
        ValueRef::Integer(i) => CleanValue::Int(i),
        ValueRef::Real(f) => CleanValue::Real(f),
        ValueRef::Text(t) => CleanValue::Text(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => CleanValue::Text(String::from_utf8_lossy(b).to_string()),
    }
}

#[async_trait]
impl PlatformMetricsRepository for PlatformMetricsRepositoryImpl {
    async fn upsert_batch(
        &self,
        records: &[MetricRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<()>>> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let sp = tx.savepoint()?;
            match Self::upsert_one(&sp, record) {
                Ok(()) => {
                    sp.commit()?;
                    outcomes.push(Ok(()));
                }
                Err(e) => {
                    // drop 即回滚到 savepoint，只丢弃本行
                    drop(sp);
                    outcomes.push(Err(e));
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcomes)
    }

    async fn find(&self, key: &MetricKey) -> RepositoryResult<Option<BTreeMap<String, CleanValue>>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT * FROM platform_daily_metrics \
             WHERE report_date = ?1 AND store_id = ?2 AND platform_id = ?3",
        )?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

        let found = stmt
            .query_row(
                params![key.report_date, key.store_id, key.platform_id],
                |row| {
                    let mut fields = BTreeMap::new();
                    for (idx, name) in names.iter().enumerate() {
                        if METRIC_KEY_COLUMNS.contains(&name.as_str()) {
                            continue;
                        }
                        fields.insert(name.clone(), value_ref_to_clean(row.get_ref(idx)?));
                    }
                    Ok(fields)
                },
            )
            .optional()?;
        Ok(found)
    }

    async fn count(&self) -> RepositoryResult<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM platform_daily_metrics", [], |row| {
            row.get(0)
        })?;
        Ok(n as usize)
    }
}
