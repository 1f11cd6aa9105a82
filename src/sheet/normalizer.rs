use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ROLL_NUMBER_FIELD;
use super::cells::RawSheet;
use super::mapping::ColumnMapping;
use crate::models::uploads::responses::RowData;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// 表头规范化：去首尾空白、小写、连续空白合并为一个空格
pub fn normalize_header(header: &str) -> String {
    WHITESPACE_RUN
        .replace_all(header.trim(), " ")
        .to_lowercase()
}

/// 学号规范化：去掉所有空白
pub fn clean_roll_number(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

/// 规范化后的一行
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// 表格中的行号（表头为第 1 行）
    pub index: usize,
    pub fields: RowData,
    /// 清理前的学号原文（仅去首尾空白）
    pub raw_roll_number: Option<String>,
}

impl SheetRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_deref())
    }

    pub fn roll_number(&self) -> Option<&str> {
        self.get(ROLL_NUMBER_FIELD)
    }
}

/// 按映射把原始表整理为逻辑字段行
///
/// 表头行被丢弃；映射中找不到的表头忽略；学号为空的行直接丢弃。
pub fn normalize_rows(sheet: &RawSheet, mapping: &ColumnMapping) -> Vec<SheetRow> {
    let Some(header) = sheet.header() else {
        return Vec::new();
    };

    let header_keys: Vec<String> = header
        .iter()
        .map(|cell| normalize_header(&cell.to_text().unwrap_or_default()))
        .collect();

    // 逻辑字段 → 列下标
    let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
    for column in mapping.columns() {
        let key = normalize_header(&column.header);
        if let Some(index) = header_keys.iter().position(|h| *h == key) {
            columns.insert(column.field.as_str(), index);
        }
    }

    let mut rows = Vec::new();
    for (offset, cells) in sheet.data_rows().iter().enumerate() {
        let mut fields = RowData::new();
        let mut raw_roll_number = None;

        for (field, index) in &columns {
            let text = cells.get(*index).and_then(|cell| cell.to_text());
            let trimmed = text
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);

            let value = if *field == ROLL_NUMBER_FIELD {
                raw_roll_number = trimmed.clone();
                trimmed.as_deref().and_then(clean_roll_number)
            } else {
                trimmed
            };
            fields.insert((*field).to_string(), value);
        }

        if fields.get(ROLL_NUMBER_FIELD).is_none_or(|v| v.is_none()) {
            continue;
        }

        rows.push(SheetRow {
            index: offset + 2,
            fields,
            raw_roll_number,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::cells::SheetCell;

    fn mapping() -> ColumnMapping {
        ColumnMapping::from_headers([
            ("roll no", "roll_number"),
            ("PHYSICS", "physics"),
            ("Chemistry", "chemistry"),
        ])
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Math \t  Score "), "math score");
        assert_eq!(normalize_header("ROLL"), "roll");
    }

    #[test]
    fn test_roll_number_whitespace_stripped() {
        assert_eq!(clean_roll_number(" 10 2 ").as_deref(), Some("102"));
        assert_eq!(clean_roll_number("   "), None);
    }

    #[test]
    fn test_rows_are_mapped_case_insensitively() {
        let sheet = RawSheet::new(vec![
            vec![
                SheetCell::Text(" Roll   No ".into()),
                SheetCell::Text("Physics".into()),
                SheetCell::Text("chemistry ".into()),
                SheetCell::Text("Remarks".into()),
            ],
            vec![
                SheetCell::Text(" 10 2 ".into()),
                SheetCell::Number(80.0),
                SheetCell::Text("  ".into()),
                SheetCell::Text("ok".into()),
            ],
            vec![SheetCell::Number(103.0), SheetCell::Number(0.0)],
        ]);

        let rows = normalize_rows(&sheet, &mapping());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[0].roll_number(), Some("102"));
        assert_eq!(rows[0].raw_roll_number.as_deref(), Some("10 2"));
        assert_eq!(rows[0].get("physics"), Some("80"));
        assert_eq!(rows[0].get("chemistry"), None);
        assert!(!rows[0].fields.contains_key("remarks"));

        assert_eq!(rows[1].roll_number(), Some("103"));
        assert_eq!(rows[1].get("physics"), Some("0"));
        assert_eq!(rows[1].fields.get("chemistry"), Some(&None));
    }

    #[test]
    fn test_rows_without_roll_number_are_dropped() {
        let sheet = RawSheet::from_text_rows(vec![
            vec!["Roll No", "Physics"],
            vec!["", "90"],
            vec![" ", "91"],
            vec!["104", "92"],
        ]);
        let rows = normalize_rows(&sheet, &mapping());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].index, 4);
    }

    #[test]
    fn test_unmatched_roll_column_yields_nothing() {
        let sheet = RawSheet::from_text_rows(vec![vec!["Student", "Physics"], vec!["1", "2"]]);
        assert!(normalize_rows(&sheet, &mapping()).is_empty());
        assert!(normalize_rows(&RawSheet::default(), &mapping()).is_empty());
    }
}
