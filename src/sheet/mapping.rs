use std::collections::BTreeMap;

use serde::Serialize;

use super::ROLL_NUMBER_FIELD;
use crate::errors::{ExamLedgerError, Result};

/// 表头 → 逻辑字段映射
///
/// 保留调用方给出的原始表头文本，比较时统一做大小写与空白规范化。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMapping {
    columns: Vec<MappedColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedColumn {
    pub header: String,
    pub field: String,
}

impl ColumnMapping {
    /// 由 `{表头: 逻辑字段}` 构建
    pub fn from_headers<I, H, F>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (H, F)>,
        H: Into<String>,
        F: Into<String>,
    {
        let mut mapping = Self::default();
        for (header, field) in pairs {
            mapping.insert(header.into(), field.into());
        }
        mapping
    }

    /// 由请求中的 `{逻辑字段: 表头}` 构建，空白项跳过
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let mut mapping = Self::default();
        for (field, header) in fields {
            mapping.insert(header.clone(), field.clone());
        }
        mapping
    }

    fn insert(&mut self, header: String, field: String) {
        let header = header.trim().to_string();
        let field = field.trim().to_string();
        if header.is_empty() || field.is_empty() {
            return;
        }
        // 同一逻辑字段以最后一次为准
        self.columns.retain(|c| c.field != field);
        self.columns.push(MappedColumn { header, field });
    }

    /// 必须包含学号列
    pub fn validate(&self) -> Result<()> {
        if self.header_for(ROLL_NUMBER_FIELD).is_none() {
            return Err(ExamLedgerError::validation(
                "Column mapping must include roll_number",
            ));
        }
        Ok(())
    }

    pub fn header_for(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.header.as_str())
    }

    pub fn columns(&self) -> &[MappedColumn] {
        &self.columns
    }
}
