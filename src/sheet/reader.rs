use std::io::Cursor;
use std::path::Path;

use calamine::{Reader, open_workbook_auto_from_rs};

use super::cells::{RawSheet, SheetCell};
use crate::errors::{ExamLedgerError, Result};

/// 支持的表格格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
    Ods,
    Csv,
}

impl SheetFormat {
    /// 根据文件名扩展名推断
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_lowercase();
        match extension.as_str() {
            "xlsx" => Some(SheetFormat::Xlsx),
            "xls" => Some(SheetFormat::Xls),
            "ods" => Some(SheetFormat::Ods),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

/// 读取整张表（工作簿取第一个工作表）
pub fn read_sheet(data: &[u8], file_name: &str) -> Result<RawSheet> {
    let format = SheetFormat::from_file_name(file_name).ok_or_else(|| {
        ExamLedgerError::sheet_parse(format!("Unsupported sheet file: {file_name}"))
    })?;

    let mut sheet = match format {
        SheetFormat::Csv => read_csv(data)?,
        SheetFormat::Xlsx | SheetFormat::Xls | SheetFormat::Ods => read_workbook(data)?,
    };

    strip_bom(&mut sheet);
    trim_trailing_blank_rows(&mut sheet);
    Ok(sheet)
}

/// 读取表头行：每个单元格转为文本并去除首尾空白
pub fn read_headers(data: &[u8], file_name: &str) -> Result<Vec<String>> {
    let sheet = read_sheet(data, file_name)?;
    let header = sheet
        .header()
        .ok_or_else(|| ExamLedgerError::sheet_parse("Sheet has no header row"))?;

    Ok(header
        .iter()
        .map(|cell| cell.to_text().unwrap_or_default().trim().to_string())
        .collect())
}

fn read_workbook(data: &[u8]) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ExamLedgerError::sheet_parse(format!("打开工作簿失败: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExamLedgerError::sheet_parse("工作簿中没有工作表"))?
        .map_err(|e| ExamLedgerError::sheet_parse(format!("读取工作表失败: {e}")))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(SheetCell::from).collect())
        .collect();

    Ok(RawSheet::new(rows))
}

fn read_csv(data: &[u8]) -> Result<RawSheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            ExamLedgerError::sheet_parse(format!("第 {} 行解析失败: {e}", line + 1))
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        SheetCell::Empty
                    } else {
                        SheetCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet::new(rows))
}

fn strip_bom(sheet: &mut RawSheet) {
    if let Some(SheetCell::Text(first)) = sheet.rows.first_mut().and_then(|r| r.first_mut())
        && let Some(stripped) = first.strip_prefix('\u{feff}')
    {
        *first = stripped.to_string();
    }
}

fn trim_trailing_blank_rows(sheet: &mut RawSheet) {
    while sheet
        .rows
        .last()
        .is_some_and(|row| row.iter().all(|c| *c == SheetCell::Empty))
    {
        sheet.rows.pop();
    }
}
