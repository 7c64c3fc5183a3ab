// ==========================================
// SWIFT 代码登记系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// 输出: 表头 + 带行号的数据行（表头为第 0 行）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::swift_code_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::warn;

// ==========================================
// CellValue - 单元格值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(String),
    Error(String), // 公式错误等不可读单元格
}

impl CellValue {
    /// 转为文本；不可读单元格返回 None
    ///
    /// 整数值的浮点数按整数输出（Excel 中数字单元格默认为浮点）
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => Some(String::new()),
            CellValue::Text(s) | CellValue::DateTime(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", *f as i64))
                } else {
                    Some(f.to_string())
                }
            }
            CellValue::Bool(b) => Some(b.to_string().to_uppercase()),
            CellValue::Error(_) => None,
        }
    }

    /// 是否为空白
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(_) => CellValue::DateTime(cell.to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RawRow / RawTable
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub row_number: usize,
    pub cells: Vec<CellValue>,
}

impl RawRow {
    /// 取指定列；行比表头短时视为空
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&EMPTY_CELL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub sheet_name: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// 由表头行 + 后续行构建；第一行全空时返回 MissingHeaderRow
    fn from_rows<I>(sheet_name: Option<String>, mut rows: I) -> ImportResult<Self>
    where
        I: Iterator<Item = Vec<CellValue>>,
    {
        let header_cells = rows.next().ok_or(ImportError::EmptyInput)?;
        if header_cells.iter().all(CellValue::is_blank) {
            return Err(ImportError::MissingHeaderRow);
        }

        let headers = header_cells
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default().trim().to_string())
            .collect();

        let rows = rows
            .enumerate()
            .map(|(idx, cells)| RawRow {
                row_number: idx + 1,
                cells,
            })
            .collect();

        Ok(Self {
            sheet_name,
            headers,
            rows,
        })
    }
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ImportError::FileNotFound(path.display().to_string()))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

fn csv_cell(row_number: usize, col: usize, value: &[u8]) -> CellValue {
    if value.is_empty() {
        return CellValue::Empty;
    }
    match std::str::from_utf8(value) {
        Ok(text) => CellValue::Text(text.to_string()),
        Err(e) => {
            warn!(row_number = row_number, column = col, error = %e, "单元格不是合法 UTF-8");
            CellValue::Error(format!("invalid utf-8: {}", e))
        }
    }
}

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path, _sheet_name: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 按字节读取：非 UTF-8 单元格只影响所在行
        let mut rows = Vec::new();
        for result in reader.byte_records() {
            let record = result?;
            let row_number = rows.len();
            rows.push(
                record
                    .iter()
                    .enumerate()
                    .map(|(col, value)| csv_cell(row_number, col, value))
                    .collect::<Vec<_>>(),
            );
        }

        RawTable::from_rows(None, rows.into_iter())
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names();
        let sheet = match sheet_name {
            Some(name) => sheet_names
                .iter()
                .find(|s| s.as_str() == name)
                .cloned()
                .ok_or_else(|| ImportError::SheetNotFound(name.to_string()))?,
            None => sheet_names.first().cloned().ok_or(ImportError::NoSheets)?,
        };

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        // range 从第一个非空单元格开始；首行为空时表头缺失
        match range.start() {
            None => return Err(ImportError::EmptyInput),
            Some((first_row, _)) if first_row > 0 => {
                warn!(sheet = %sheet, first_row = first_row, "工作表首行为空");
                return Err(ImportError::MissingHeaderRow);
            }
            Some(_) => {}
        }

        let rows = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect::<Vec<_>>());

        RawTable::from_rows(Some(sheet), rows)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<RawTable> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" => CsvParser.parse(file_path, sheet_name),
            e if EXCEL_EXTENSIONS.contains(&e) => ExcelParser.parse(file_path, sheet_name),
            _ => {
                ensure_exists(file_path)?;
                Err(ImportError::UnsupportedFormat(ext))
            }
        }
    }
}
