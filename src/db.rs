// ==========================================
// 门店运营数据导入 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout
// - 建立导入目标表（平台指标表的列由列映射表生成）
// ==========================================

use crate::config::ColumnTable;
use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// foreign_keys / busy_timeout 都需要每个连接单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// platform_daily_metrics 的指标列来自列映射表；
/// 已存在的表只补齐缺失列，不删除旧列。
pub fn init_schema(conn: &Connection, columns: &ColumnTable) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS product (
            product_id INTEGER PRIMARY KEY,
            product_name TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_product_name ON product(product_name);

        CREATE TABLE IF NOT EXISTS sales_summary (
            summary_period TEXT NOT NULL,
            store_id INTEGER NOT NULL,
            product_name TEXT NOT NULL,
            product_id INTEGER,
            total_quantity REAL NOT NULL DEFAULT 0,
            total_presales REAL NOT NULL DEFAULT 0,
            total_revenue REAL NOT NULL DEFAULT 0,
            total_discount REAL NOT NULL DEFAULT 0,
            avg_discount_rate REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (summary_period, store_id, product_name)
        );
        "#,
    )?;

    let mut ddl = String::from(
        "CREATE TABLE IF NOT EXISTS platform_daily_metrics (\n    \
         report_date TEXT NOT NULL,\n    \
         store_id INTEGER NOT NULL,\n    \
         platform_id INTEGER NOT NULL",
    );
    for (field, class) in columns.fields() {
        ddl.push_str(&format!(",\n    {} {}", field, class.sqlite_type()));
    }
    ddl.push_str(",\n    PRIMARY KEY (report_date, store_id, platform_id)\n)");
    conn.execute(&ddl, [])?;

    // 列映射表新增字段时补列
    let existing = table_columns(conn, "platform_daily_metrics")?;
    for (field, class) in columns.fields() {
        if !existing.iter().any(|c| c == field) {
            conn.execute(
                &format!(
                    "ALTER TABLE platform_daily_metrics ADD COLUMN {} {}",
                    field,
                    class.sqlite_type()
                ),
                [],
            )?;
        }
    }

    Ok(())
}

/// 读取表的列名
pub fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let columns = rows.collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(columns)
}
