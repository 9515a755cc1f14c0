// ==========================================
// 门店运营数据导入 - 菜品销售汇总 Repository
// ==========================================
// 职责: 产品 ID 查询 + sales_summary 的 upsert
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::sales::SalesRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// SalesSummaryRepository Trait
// ==========================================
#[async_trait]
pub trait SalesSummaryRepository: Send + Sync {
    /// 按名称查找产品 ID（name 或 alt_name 任一匹配）
    async fn find_product_id(&self, name: &str, alt_name: &str) -> RepositoryResult<Option<i64>>;

    /// 批量 upsert（一个事务，逐行 savepoint）
    async fn upsert_batch(
        &self,
        records: &[SalesRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<()>>>;

    async fn find(
        &self,
        period: &str,
        store_id: i64,
        product_name: &str,
    ) -> RepositoryResult<Option<SalesRecord>>;

    async fn count(&self) -> RepositoryResult<usize>;
}

// ==========================================
// SalesSummaryRepositoryImpl
// ==========================================
pub struct SalesSummaryRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl SalesSummaryRepositoryImpl {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 写入产品主数据（初始化/测试用）
    pub fn insert_product(&self, product_id: i64, product_name: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO product (product_id, product_name) VALUES (?1, ?2)",
            params![product_id, product_name],
        )?;
        Ok(())
    }

    fn upsert_one(conn: &Connection, record: &SalesRecord, now: &str) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO sales_summary (
                summary_period, store_id, product_name, product_id,
                total_quantity, total_presales, total_revenue, total_discount,
                avg_discount_rate, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            ON CONFLICT (summary_period, store_id, product_name) DO UPDATE SET
                product_id = excluded.product_id,
                total_quantity = excluded.total_quantity,
                total_presales = excluded.total_presales,
                total_revenue = excluded.total_revenue,
                total_discount = excluded.total_discount,
                avg_discount_rate = excluded.avg_discount_rate,
                updated_at = excluded.updated_at
            "#,
            params![
                record.period,
                record.store_id,
                record.product_name,
                record.product_id,
                record.quantity,
                record.pre_discount_amount,
                record.revenue,
                record.discount,
                record.discount_rate,
                now,
            ],
        )?;
        Ok(())
    }
}

#[async_trait]
impl SalesSummaryRepository for SalesSummaryRepositoryImpl {
    async fn find_product_id(&self, name: &str, alt_name: &str) -> RepositoryResult<Option<i64>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let id = conn
            .query_row(
                "SELECT product_id FROM product \
                 WHERE product_name = ?1 OR product_name = ?2 \
                 ORDER BY product_id LIMIT 1",
                params![name, alt_name],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id)
    }

    async fn upsert_batch(
        &self,
        records: &[SalesRecord],
    ) -> RepositoryResult<Vec<RepositoryResult<()>>> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let sp = tx.savepoint()?;
            match Self::upsert_one(&sp, record, &now) {
                Ok(()) => {
                    sp.commit()?;
                    outcomes.push(Ok(()));
                }
                Err(e) => {
                    drop(sp);
                    outcomes.push(Err(e));
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcomes)
    }

    async fn find(
        &self,
        period: &str,
        store_id: i64,
        product_name: &str,
    ) -> RepositoryResult<Option<SalesRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let found = conn
            .query_row(
                r#"
                SELECT summary_period, store_id, product_name, product_id,
                       total_quantity, total_presales, total_revenue, total_discount,
                       avg_discount_rate
                FROM sales_summary
                WHERE summary_period = ?1 AND store_id = ?2 AND product_name = ?3
                "#,
                params![period, store_id, product_name],
                |row| {
                    Ok(SalesRecord {
                        period: row.get(0)?,
                        store_id: row.get(1)?,
                        product_name: row.get(2)?,
                        product_id: row.get(3)?,
                        quantity: row.get(4)?,
                        pre_discount_amount: row.get(5)?,
                        revenue: row.get(6)?,
                        discount: row.get(7)?,
                        discount_rate: row.get(8)?,
                        row_number: 0,
                    })
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
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM sales_summary", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
