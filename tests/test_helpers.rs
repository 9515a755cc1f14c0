// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、xlsx 测试文件生成
// ==========================================

#![allow(dead_code)]

use restaurant_ops_import::config::ColumnTable;
use restaurant_ops_import::db::{init_schema, open_sqlite_connection};
use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - Arc<Mutex<Connection>>: 供多个 Repository 共用的连接
pub fn create_test_db() -> Result<(NamedTempFile, Arc<Mutex<Connection>>), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn, &ColumnTable::default())?;

    Ok((temp_file, Arc::new(Mutex::new(conn))))
}

/// 测试表格单元格
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

/// 写出一个工作表
pub fn write_xlsx(path: &Path, sheet_name: &str, rows: &[Vec<Cell>]) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r as u32, c as u16, *s)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(r as u32, c as u16, *n)?;
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

// ==========================================
// 平台导出文件
// ==========================================

/// 平台导出文件的一行数据
pub struct PlatformRow {
    pub date: &'static str,
    pub store: &'static str,
    pub exposure: Cell,
    pub positive_rate: Cell,
    pub ranking: Cell,
    pub city: Cell,
    pub gmv: Cell,
}

impl PlatformRow {
    pub fn new(date: &'static str, store: &'static str, exposure: f64) -> Self {
        Self {
            date,
            store,
            exposure: Cell::Number(exposure),
            positive_rate: Cell::Text("98%"),
            ranking: Cell::Text("德阳烤肉榜第3名"),
            city: Cell::Text("德阳"),
            gmv: Cell::Number(1288.5),
        }
    }
}

/// 写出平台导出文件（工作表 "表1"，第 0 行为标题，第 1 行为表头）
pub fn write_platform_file(path: &Path, rows: Vec<PlatformRow>) -> Result<(), Box<dyn Error>> {
    let mut grid = vec![
        vec![Cell::Text("门店经营数据")],
        vec![
            Cell::Text("日期"),
            Cell::Text("门店名称"),
            Cell::Text("曝光次数"),
            Cell::Text("好评率"),
            Cell::Text("美团人气榜榜单排名"),
            Cell::Text("城市"),
            Cell::Text("成交金额(优惠前)"),
        ],
    ];
    for row in rows {
        grid.push(vec![
            Cell::Text(row.date),
            Cell::Text(row.store),
            row.exposure,
            row.positive_rate,
            row.ranking,
            row.city,
            row.gmv,
        ]);
    }
    write_xlsx(path, "表1", &grid)
}

// ==========================================
// 菜品销售统计表
// ==========================================

/// (菜品名称, 销售数量, 销售额, 菜品收入, 菜品优惠)
pub type SalesRow = (Cell, f64, f64, f64, f64);

/// 写出菜品销售统计表（前两行为标题，第 2 行表头，第 3 行子表头）
pub fn write_sales_file(path: &Path, rows: Vec<SalesRow>) -> Result<(), Box<dyn Error>> {
    let mut grid = vec![
        vec![Cell::Text("菜品销售统计")],
        vec![Cell::Text("统计时间: 2025-01-01 至 2025-11-22")],
        vec![
            Cell::Text("菜品名称"),
            Cell::Text("销售数量"),
            Cell::Text("占比"),
            Cell::Text("销售额"),
            Cell::Text("占比"),
            Cell::Text("菜品收入"),
            Cell::Text("占比"),
            Cell::Text("菜品优惠"),
        ],
        vec![
            Cell::Blank,
            Cell::Text("份"),
            Cell::Blank,
            Cell::Text("元"),
            Cell::Blank,
            Cell::Text("元"),
            Cell::Blank,
            Cell::Text("元"),
        ],
    ];
    for (name, qty, pre, revenue, discount) in rows {
        grid.push(vec![
            name,
            Cell::Number(qty),
            Cell::Blank,
            Cell::Number(pre),
            Cell::Blank,
            Cell::Number(revenue),
            Cell::Blank,
            Cell::Number(discount),
        ]);
    }
    write_xlsx(path, "Sheet1", &grid)
}
