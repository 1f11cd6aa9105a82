use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::errors::{ExamLedgerError, Result};

/// multipart 文本字段
pub type FormFields = HashMap<String, String>;

// 成绩上传表单（multipart 文本字段）
#[derive(Debug, Clone, Deserialize)]
pub struct ExamResultUploadForm {
    pub class_id: i64,
    // {逻辑字段: 表头}
    pub column_mapping: BTreeMap<String, String>,
}

impl ExamResultUploadForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        let class_id = parse_id(fields, "class_id")?
            .ok_or_else(|| ExamLedgerError::validation("class_id is required"))?;
        Ok(Self {
            class_id,
            column_mapping: parse_column_mapping(fields)?,
        })
    }
}

// 快速上传表单
#[derive(Debug, Clone, Deserialize)]
pub struct QuickUploadForm {
    pub exam_name: String,
    pub exam_date: String,
    pub column_mapping: BTreeMap<String, String>,
}

impl QuickUploadForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        let text = |name: &str| {
            fields
                .get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ExamLedgerError::validation(format!("{name} is required")))
        };
        Ok(Self {
            exam_name: text("exam_name")?,
            exam_date: text("exam_date")?,
            column_mapping: parse_column_mapping(fields)?,
        })
    }
}

// 学生名册上传表单
#[derive(Debug, Clone, Deserialize)]
pub struct StudentUploadForm {
    pub class_id: Option<i64>,
    pub column_mapping: BTreeMap<String, String>,
}

impl StudentUploadForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self> {
        Ok(Self {
            class_id: parse_id(fields, "class_id")?,
            column_mapping: parse_column_mapping(fields)?,
        })
    }
}

fn parse_id(fields: &FormFields, name: &str) -> Result<Option<i64>> {
    match fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ExamLedgerError::validation(format!("{name} must be an integer"))),
    }
}

// column_mapping 为 JSON 对象，值为 null 的条目视为未映射
fn parse_column_mapping(fields: &FormFields) -> Result<BTreeMap<String, String>> {
    let raw = fields
        .get("column_mapping")
        .ok_or_else(|| ExamLedgerError::validation("column_mapping is required"))?;
    let parsed: BTreeMap<String, Option<String>> = serde_json::from_str(raw)
        .map_err(|e| ExamLedgerError::validation(format!("column_mapping is not valid JSON: {e}")))?;
    Ok(parsed
        .into_iter()
        .filter_map(|(field, header)| header.map(|h| (field, h)))
        .collect())
}
