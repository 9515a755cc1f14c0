// ==========================================
// 门店运营数据导入 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// 输出: Vec<RawRow>（表头 → 单元格值）
// ==========================================

use crate::config::{SheetLayout, SheetSelector};
use crate::domain::types::{CellValue, RawRow};
use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 文件解析接口
pub trait FileParser: Send + Sync {
    /// 按表格布局解析为行记录
    fn parse_rows(&self, file_path: &Path, layout: &SheetLayout) -> ImportResult<Vec<RawRow>>;
}

/// 按布局把单元格网格转换为行记录
///
/// - 表头取 `header_row` 行（或 `column_names` 按位置覆盖）
/// - 丢弃表头后 `skip_rows_after_header` 行
/// - 跳过完全空白的行
pub fn rows_from_grid(grid: Vec<Vec<CellValue>>, layout: &SheetLayout) -> ImportResult<Vec<RawRow>> {
    let header_cells = grid
        .get(layout.header_row)
        .ok_or(ImportError::HeaderRowMissing(layout.header_row))?;

    let headers: Vec<String> = match &layout.column_names {
        Some(names) => names.clone(),
        None => header_cells
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
    };

    let first_data_row = layout.header_row + 1 + layout.skip_rows_after_header;
    let mut records = Vec::new();
    for data_row in grid.into_iter().skip(first_data_row) {
        let mut row_map: RawRow = HashMap::new();
        for (col_idx, header) in headers.iter().enumerate() {
            if header.is_empty() || row_map.contains_key(header) {
                continue;
            }
            let value = data_row.get(col_idx).cloned().unwrap_or(CellValue::Empty);
            row_map.insert(header.clone(), value);
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_blank()) {
            continue;
        }
        records.push(row_map);
    }

    Ok(records)
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path, layout: &SheetLayout) -> ImportResult<Vec<RawRow>> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let mut grid = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(value)
                    }
                })
                .collect();
            grid.push(row);
        }

        rows_from_grid(grid, layout)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::DateTime(naive),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path, layout: &SheetLayout) -> ImportResult<Vec<RawRow>> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names();
        let sheet_name = match &layout.sheet {
            SheetSelector::Index(idx) => sheet_names
                .get(*idx)
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound(format!("#{}", idx)))?,
            SheetSelector::Name(name) => {
                if !sheet_names.iter().any(|n| n == name) {
                    return Err(ImportError::SheetNotFound(name.clone()));
                }
                name.clone()
            }
        };

        let range = workbook.worksheet_range(&sheet_name)?;

        // Range 从首个非空单元格开始，补齐前导空行以保持绝对行号
        let start_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
        let mut grid: Vec<Vec<CellValue>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            grid.push(row.iter().map(convert_cell).collect());
        }

        rows_from_grid(grid, layout)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_rows(&self, file_path: &Path, layout: &SheetLayout) -> ImportResult<Vec<RawRow>> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse_rows(file_path, layout),
            "xlsx" | "xls" | "xlsm" => ExcelParser.parse_rows(file_path, layout),
            other => {
                check_exists(file_path)?;
                Err(ImportError::UnsupportedFormat(other.to_string()))
            }
        }
    }
}
